use kclust::distance::pairwise_distances;
use kclust::prelude::*;
use kclust_kmeans::{Advisor, ClusterMetric, KMeans};
use kclust_preprocessing::StandardScaler;

// The usual exploratory workflow on a small table: standardize it, look at the distances,
// score a range of cluster counts with both heuristics and partition with the chosen count.
fn main() {
    tracing_subscriber::fmt::init();

    let dataset = kclust_datasets::arrests();
    let scaler = StandardScaler::standard()
        .fit(&dataset)
        .expect("arrests table is not empty");
    let dataset = scaler.transform(dataset);

    let names = dataset.observation_names();
    let distances = pairwise_distances(dataset.records());
    let (closest, _) = distances
        .indexed_iter()
        .filter(|((i, j), _)| i < j)
        .fold(((0, 0), f64::INFINITY), |best, (idx, &d)| {
            if d < best.1 {
                (idx, d)
            } else {
                best
            }
        });
    println!(
        "most similar regions: {} and {} (distance {:.3})",
        names[closest.0],
        names[closest.1],
        distances[closest]
    );

    for metric in &[ClusterMetric::WithinSs, ClusterMetric::Silhouette] {
        let series = Advisor::params(metric.min_clusters()..=10)
            .metric(*metric)
            .n_runs(25)
            .advise(&dataset)
            .expect("advisor ran");

        println!("\n{}", metric);
        for (k, score) in &series {
            println!("  k = {:2}  {:10.4}", k, score);
        }
    }

    // the bend of the within-cluster curve is usually read at four groups on this table
    let model = KMeans::params(4)
        .n_runs(25)
        .fit(&dataset)
        .expect("KMeans fitted");
    println!(
        "\nconverged = {} after {} iterations, between / total = {:.3}",
        model.converged(),
        model.n_iterations(),
        model.between_ss() / model.total_ss()
    );

    let clustered = model.predict(dataset);
    for cluster in 0..model.n_clusters() {
        let members: Vec<_> = clustered
            .targets()
            .iter()
            .zip(names.iter())
            .filter(|(c, _)| **c == cluster)
            .map(|(_, name)| name.as_str())
            .collect();
        println!(
            "cluster {} ({} regions): {}",
            cluster,
            model.cluster_sizes()[cluster],
            members.join(", ")
        );
    }
}
