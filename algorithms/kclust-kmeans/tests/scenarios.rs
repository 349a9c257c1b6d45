use approx::assert_abs_diff_eq;
use ndarray::{array, Array1, Array2, Axis};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use kclust::metrics::{average_silhouette, silhouette_samples, total_ss, within_ss};
use kclust::prelude::*;
use kclust_datasets::generate;
use kclust_kmeans::{
    advise, partition, total_within_ss, Advisor, ClusterMetric, KMeans, KMeansError, KMeansInit,
};
use kclust_preprocessing::StandardScaler;

fn four_points() -> Dataset<f64> {
    Dataset::from(array![[0., 0.], [0., 1.], [10., 10.], [10., 11.]])
}

fn sorted_rows(a: &Array2<f64>) -> Vec<Vec<f64>> {
    let mut rows: Vec<_> = a.rows().into_iter().map(|r| r.to_vec()).collect();
    rows.sort_by(|a, b| a.partial_cmp(b).unwrap());
    rows
}

fn three_blobs(rng: &mut Xoshiro256Plus) -> Dataset<f64> {
    let centres = array![[0., 0., 0.], [12., 0., 5.], [-6., 10., -3.]];
    Dataset::from(generate::blobs(40, &centres, rng))
}

#[test]
fn four_points_split_in_two_pairs() {
    let model = partition(&four_points(), 2, 5, 100, 1).unwrap();

    assert!(model.converged());
    assert_eq!(
        sorted_rows(model.centroids()),
        vec![vec![0., 0.5], vec![10., 10.5]]
    );
    assert_abs_diff_eq!(total_within_ss(&model), 1.0);
    assert_abs_diff_eq!(*model.within_ss(), array![0.5, 0.5]);
    assert_abs_diff_eq!(model.total_ss(), 201.0, epsilon = 1e-12);
    assert_abs_diff_eq!(model.between_ss(), 200.0, epsilon = 1e-12);
    assert_eq!(model.cluster_sizes(), &array![2, 2]);

    let memberships = model.memberships();
    assert_eq!(memberships[0], memberships[1]);
    assert_eq!(memberships[2], memberships[3]);
    assert_ne!(memberships[0], memberships[2]);
}

#[test]
fn kmeans_plusplus_finds_the_same_pairs() {
    let model = KMeans::params(2)
        .init_method(KMeansInit::KMeansPlusPlus)
        .n_runs(3)
        .fit(&four_points())
        .unwrap();

    assert_eq!(
        sorted_rows(model.centroids()),
        vec![vec![0., 0.5], vec![10., 10.5]]
    );
    assert_abs_diff_eq!(model.total_within_ss(), 1.0);
}

#[test]
fn elbow_series_on_four_points() {
    let series = advise(&four_points(), 1..=4, 5, 100, 1, ClusterMetric::WithinSs).unwrap();

    assert_eq!(series.ks(), vec![1, 2, 3, 4]);
    let scores = series.scores();
    assert_abs_diff_eq!(
        Array1::from(scores.clone()),
        array![201., 1., 0.5, 0.],
        epsilon = 1e-12
    );
    for pair in scores.windows(2) {
        assert!(pair[1] < pair[0]);
    }
    // sharp drop at k = 2, nothing left to explain at k = n
    assert!(scores[0] - scores[1] > 100. * (scores[1] - scores[2]));
    assert_abs_diff_eq!(scores[3], 0.);
}

#[test]
fn silhouette_series_on_four_points() {
    let series = Advisor::params(2..=4)
        .metric(ClusterMetric::Silhouette)
        .n_runs(5)
        .advise(&four_points())
        .unwrap();

    assert_eq!(series.metric(), ClusterMetric::Silhouette);
    assert_eq!(series.ks(), vec![2, 3, 4]);
    assert!(series.scores().iter().all(|s| (-1.0..=1.0).contains(s)));
    assert!(series.get(2).unwrap() > 0.9);
    assert_abs_diff_eq!(series.get(4).unwrap(), 1.0);
}

#[test]
fn single_cluster_is_the_grand_mean() {
    let mut rng = Xoshiro256Plus::seed_from_u64(3);
    let dataset = three_blobs(&mut rng);
    let model = partition(&dataset, 1, 3, 50, 3).unwrap();

    let mean = dataset.records().mean_axis(Axis(0)).unwrap();
    assert_abs_diff_eq!(model.centroids().row(0), mean, epsilon = 1e-10);
    assert_abs_diff_eq!(
        model.total_within_ss(),
        total_ss(dataset.records()),
        epsilon = 1e-8
    );
    assert_abs_diff_eq!(model.between_ss(), 0., epsilon = 1e-8);
    assert_eq!(model.n_iterations(), 1);
}

#[test]
fn one_cluster_per_observation() {
    let dataset = four_points();
    let model = partition(&dataset, 4, 2, 10, 8).unwrap();

    assert!(model.converged());
    assert_eq!(model.n_iterations(), 1);
    assert_eq!(model.cluster_sizes(), &Array1::<usize>::from_elem(4, 1));
    assert_abs_diff_eq!(model.total_within_ss(), 0.);
    assert_eq!(
        sorted_rows(model.centroids()),
        sorted_rows(dataset.records())
    );

    let silhouette = silhouette_samples(dataset.records(), model.memberships()).unwrap();
    assert_abs_diff_eq!(silhouette, Array1::<f64>::ones(4));
}

#[test]
fn identical_inputs_give_identical_results() {
    let mut rng = Xoshiro256Plus::seed_from_u64(21);
    let dataset = three_blobs(&mut rng);
    let params = KMeans::params(4).n_runs(8).seed(1234);

    let first = params.fit(&dataset).unwrap();
    let second = params.fit(&dataset).unwrap();
    assert_eq!(first, second);

    // the outcome does not depend on how restarts are scheduled
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap();
    let sequential = pool.install(|| params.fit(&dataset).unwrap());
    assert_eq!(first, sequential);

    // a different seed is allowed to differ, but must stay well formed
    let other = KMeans::params(4).n_runs(8).seed(4321).fit(&dataset).unwrap();
    assert_eq!(other.cluster_sizes().sum(), dataset.records().nrows());
}

#[test]
fn exactly_k_populated_clusters() {
    let mut rng = Xoshiro256Plus::seed_from_u64(7);
    let dataset = three_blobs(&mut rng);
    let n_samples = dataset.records().nrows();

    for k in 1..=12 {
        let model = partition(&dataset, k, 3, 300, k as u64).unwrap();
        assert_eq!(model.n_clusters(), k);
        assert_eq!(model.memberships().len(), n_samples);
        assert!(model.memberships().iter().all(|&c| c < k));
        assert!(model.cluster_sizes().iter().all(|&size| size > 0));
        assert_eq!(model.cluster_sizes().sum(), n_samples);
    }
}

#[test]
fn duplicate_rows_converge_with_an_empty_cluster() {
    let dataset = Dataset::from(array![[0., 0.], [0., 0.], [1., 1.]]);
    let model = partition(&dataset, 3, 1, 50, 0).unwrap();

    assert!(model.converged());
    assert_eq!(model.n_iterations(), 1);
    assert_eq!(model.cluster_sizes().sum(), 3);
    assert_eq!(model.cluster_sizes().iter().filter(|&&s| s == 0).count(), 1);
    assert_abs_diff_eq!(model.total_within_ss(), 0.);

    let memberships = model.memberships();
    assert_eq!(memberships[0], memberships[1]);
    assert_ne!(memberships[0], memberships[2]);

    // the empty cluster keeps a copy of an observation as its centroid
    assert_eq!(
        sorted_rows(model.centroids()),
        vec![vec![0., 0.], vec![0., 0.], vec![1., 1.]]
    );
}

#[test]
fn duplicate_centroids_are_permitted() {
    let model = KMeans::params(3)
        .init_method(KMeansInit::Precomputed(array![[0., 0.], [0., 0.], [1., 1.]]))
        .n_runs(1)
        .max_n_iterations(50)
        .fit(&Dataset::from(array![[0., 0.], [0., 0.], [1., 1.]]))
        .unwrap();

    assert!(model.converged());
    assert_eq!(model.n_iterations(), 1);
    assert_eq!(model.memberships(), &array![0, 0, 2]);
    assert_eq!(model.cluster_sizes(), &array![2, 0, 1]);
    assert_eq!(model.centroids(), &array![[0., 0.], [0., 0.], [1., 1.]]);
}

#[test]
fn dispersion_decomposes() {
    let mut rng = Xoshiro256Plus::seed_from_u64(99);
    let dataset = three_blobs(&mut rng);
    let records = dataset.records();
    let model = partition(&dataset, 3, 5, 300, 2).unwrap();

    assert_abs_diff_eq!(model.total_ss(), total_ss(records), epsilon = 1e-8);
    assert_abs_diff_eq!(
        model.total_ss(),
        model.total_within_ss() + model.between_ss(),
        epsilon = 1e-8
    );
    assert_abs_diff_eq!(
        *model.within_ss(),
        within_ss(records, model.memberships(), model.centroids()),
        epsilon = 1e-8
    );
    assert_abs_diff_eq!(
        model.within_ss().sum(),
        model.total_within_ss(),
        epsilon = 1e-8
    );
    assert!(model.between_ss() > 0.9 * model.total_ss());
}

#[test]
fn inertia_trace_never_increases() {
    let mut rng = Xoshiro256Plus::seed_from_u64(5);
    let dataset = three_blobs(&mut rng);

    for seed in 0..10 {
        let model = KMeans::params(5)
            .n_runs(1)
            .seed(seed)
            .fit(&dataset)
            .unwrap();
        let trace = model.inertia_trace();
        assert_eq!(trace.len() as u64, model.n_iterations() + 1);
        for pair in trace.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9);
        }
        assert_abs_diff_eq!(
            *trace.last().unwrap(),
            model.total_within_ss(),
            epsilon = 1e-9
        );
    }
}

#[test]
fn partition_rejects_invalid_arguments() {
    let dataset = four_points();
    assert_eq!(
        partition(&dataset, 5, 1, 10, 0).unwrap_err(),
        KMeansError::NotEnoughSamples {
            n_samples: 4,
            n_clusters: 5
        }
    );
    assert!(matches!(
        partition(&dataset, 2, 0, 10, 0),
        Err(KMeansError::InvalidParams(_))
    ));
    assert!(matches!(
        partition(&dataset, 2, 1, 0, 0),
        Err(KMeansError::InvalidParams(_))
    ));
}

#[test]
fn standardized_arrests_workflow() {
    let dataset = kclust_datasets::arrests();
    let scaler = StandardScaler::standard().fit(&dataset).unwrap();
    let dataset = scaler.transform(dataset);

    let series = Advisor::params(1..=8).n_runs(25).advise(&dataset).unwrap();
    for pair in series.scores().windows(2) {
        assert!(pair[1] < pair[0]);
    }
    // standardized columns have unit sample variance: total dispersion is (n - 1) * p
    assert_abs_diff_eq!(series.get(1).unwrap(), 49. * 4., epsilon = 1e-8);

    let model = KMeans::params(4).n_runs(25).fit(&dataset).unwrap();
    let silhouette = average_silhouette(dataset.records(), model.memberships()).unwrap();
    assert!(silhouette > 0. && silhouette <= 1.);

    let clustered = model.predict(dataset);
    assert_eq!(clustered.targets(), model.memberships());
    assert_eq!(clustered.observation_names()[0], "Alabama");
    assert_eq!(clustered.targets().len(), 50);
}

#[cfg(feature = "serde")]
#[test]
fn fitted_model_and_series_serialize() {
    let model = partition(&four_points(), 2, 5, 100, 1).unwrap();
    let json = serde_json::to_string(&model).unwrap();
    let restored: KMeans<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(model, restored);

    let series = advise(&four_points(), 1..=4, 5, 100, 1, ClusterMetric::WithinSs).unwrap();
    let json = serde_json::to_value(&series).unwrap();
    assert_eq!(json["metric"], "WithinSs");
    assert_eq!(json["scores"].as_array().unwrap().len(), 4);
}
