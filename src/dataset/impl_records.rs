use super::{DatasetBase, Records};
use ndarray::{ArrayBase, Axis, Data, Dimension};

/// Implement records for NdArrays
impl<S: Data, D: Dimension> Records for ArrayBase<S, D> {
    type Elem = S::Elem;

    fn nsamples(&self) -> usize {
        self.len_of(Axis(0))
    }

    fn nfeatures(&self) -> usize {
        if self.ndim() < 2 {
            1
        } else {
            self.len_of(Axis(1))
        }
    }
}

/// Implement records for a DatasetBase
impl<R: Records, T> Records for DatasetBase<R, T> {
    type Elem = R::Elem;

    fn nsamples(&self) -> usize {
        self.records.nsamples()
    }

    fn nfeatures(&self) -> usize {
        self.records.nfeatures()
    }
}

/// Implement records for references
impl<R: Records> Records for &R {
    type Elem = R::Elem;

    fn nsamples(&self) -> usize {
        (*self).nsamples()
    }

    fn nfeatures(&self) -> usize {
        (*self).nfeatures()
    }
}

