// Learner modules
pub mod common_types;
pub mod config;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod kmeans;
pub mod knn;
pub mod perceptron;

pub use common_types::DataPoint;
pub use error::{MlError, Result};

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;
    use pyo3::types::{PyDict, PyList};

    use crate::common_types::DataPoint;
    use crate::distance::{self, KnnDistance};
    use crate::error::MlError;
    use crate::kmeans::KMeans;
    use crate::knn::{self, KnnClassifier};
    use crate::perceptron::{BinaryLabels, Perceptron};

    fn to_py_err(err: MlError) -> PyErr {
        PyErr::new::<pyo3::exceptions::PyValueError, _>(err.to_string())
    }

    /// Accepts `{'features': [...], 'label': ...}` dicts or `([...], label)` tuples.
    fn extract_points<'py, L>(data: &Bound<'py, PyList>) -> PyResult<Vec<DataPoint<f64, L>>>
    where
        L: FromPyObject<'py>,
    {
        let mut points = Vec::with_capacity(data.len());
        for item in data.iter() {
            if let Ok(dict) = item.downcast::<PyDict>() {
                let features = dict
                    .get_item("features")?
                    .ok_or_else(|| PyErr::new::<pyo3::exceptions::PyValueError, _>("Missing 'features' key"))?
                    .extract::<Vec<f64>>()?;
                let label = dict
                    .get_item("label")?
                    .ok_or_else(|| PyErr::new::<pyo3::exceptions::PyValueError, _>("Missing 'label' key"))?
                    .extract::<L>()?;
                points.push(DataPoint::new(features, label));
            } else if let Ok((features, label)) = item.extract::<(Vec<f64>, L)>() {
                points.push(DataPoint::new(features, label));
            } else {
                return Err(PyErr::new::<pyo3::exceptions::PyTypeError, _>(
                    "Data items must be dictionaries {'features': [...], 'label': ...} or tuples ([...], label)",
                ));
            }
        }
        Ok(points)
    }

    #[pyfunction]
    fn manhattan_distance(a: Vec<f64>, b: Vec<f64>) -> PyResult<f64> {
        distance::manhattan_distance(&a, &b).map_err(to_py_err)
    }

    #[pyfunction]
    fn euclidean_distance(a: Vec<f64>, b: Vec<f64>) -> PyResult<f64> {
        distance::euclidean_distance(&a, &b).map_err(to_py_err)
    }

    /// Min-max normalizes a dataset, returning `(features, label)` tuples.
    #[pyfunction]
    fn normalize(data: &Bound<'_, PyList>) -> PyResult<Vec<(Vec<f64>, String)>> {
        let points = extract_points::<String>(data)?;
        let normalized = knn::normalize(&points).map_err(to_py_err)?;
        Ok(normalized.into_iter().map(|p| (p.features, p.label)).collect())
    }

    /// Python-friendly representation of KnnDistance
    #[pyclass(name = "KnnDistance")]
    #[derive(Clone)]
    enum PyKnnDistance {
        Euclidean,
        Manhattan,
        Chebyshev,
        Cosine,
    }

    impl From<PyKnnDistance> for KnnDistance {
        fn from(val: PyKnnDistance) -> Self {
            match val {
                PyKnnDistance::Euclidean => KnnDistance::Euclidean,
                PyKnnDistance::Manhattan => KnnDistance::Manhattan,
                PyKnnDistance::Chebyshev => KnnDistance::Chebyshev,
                PyKnnDistance::Cosine => KnnDistance::Cosine,
            }
        }
    }

    #[pyclass(name = "KnnClassifier")]
    struct PyKnnClassifier {
        classifier: KnnClassifier<f64, String>,
    }

    #[pymethods]
    impl PyKnnClassifier {
        #[new]
        #[pyo3(signature = (k, distance_metric = PyKnnDistance::Manhattan))]
        fn new(k: usize, distance_metric: PyKnnDistance) -> PyResult<Self> {
            let classifier = KnnClassifier::new(k, distance_metric.into()).map_err(to_py_err)?;
            Ok(PyKnnClassifier { classifier })
        }

        fn fit(&mut self, training_data: &Bound<'_, PyList>) -> PyResult<()> {
            let points = extract_points::<String>(training_data)?;
            self.classifier.fit(points).map_err(to_py_err)
        }

        fn predict_single(&self, test_sample_features: Vec<f64>) -> PyResult<String> {
            self.classifier.predict_single(&test_sample_features).map_err(to_py_err)
        }

        fn predict(&self, test_data: Vec<Vec<f64>>) -> PyResult<Vec<String>> {
            self.classifier.predict(&test_data).map_err(to_py_err)
        }

        fn score(&self, test_data: &Bound<'_, PyList>) -> PyResult<f64> {
            let points = extract_points::<String>(test_data)?;
            self.classifier.score(&points).map_err(to_py_err)
        }
    }

    /// Label-seeded k-means with Manhattan distance.
    #[pyclass(name = "KMeans")]
    struct PyKMeans {
        engine: KMeans,
    }

    #[pymethods]
    impl PyKMeans {
        #[new]
        #[pyo3(signature = (clusters, max_iterations = KMeans::DEFAULT_MAX_ITERATIONS))]
        fn new(clusters: usize, max_iterations: usize) -> Self {
            PyKMeans {
                engine: KMeans::new(clusters).with_max_iterations(max_iterations),
            }
        }

        /// Returns `(clusters, iterations)` where each cluster is a list of `(features, label)`.
        fn cluster(&self, data: &Bound<'_, PyList>) -> PyResult<(Vec<Vec<(Vec<f64>, i64)>>, usize)> {
            let points = extract_points::<i64>(data)?;
            let result = self
                .engine
                .cluster(&points, &KnnDistance::Manhattan)
                .map_err(to_py_err)?;
            let clusters = result
                .assignment
                .into_iter()
                .map(|group| group.into_iter().map(|p| (p.features, p.label)).collect())
                .collect();
            Ok((clusters, result.iterations))
        }
    }

    #[pyclass(name = "Perceptron")]
    struct PyPerceptron {
        model: Perceptron<f64, i64>,
    }

    #[pymethods]
    impl PyPerceptron {
        #[new]
        #[pyo3(signature = (feature_count, learning_rate = 0.1, label_min = 1, label_max = 2))]
        fn new(feature_count: usize, learning_rate: f64, label_min: i64, label_max: i64) -> PyResult<Self> {
            let labels = BinaryLabels::new(label_min, label_max).map_err(to_py_err)?;
            let model = Perceptron::new(feature_count, learning_rate, labels).map_err(to_py_err)?;
            Ok(PyPerceptron { model })
        }

        fn predict(&self, features: Vec<f64>) -> PyResult<i64> {
            self.model.predict(&features).map_err(to_py_err)
        }

        fn train(&mut self, data: &Bound<'_, PyList>, epochs: usize) -> PyResult<Vec<usize>> {
            let points = extract_points::<i64>(data)?;
            self.model.train_epochs(&points, epochs).map_err(to_py_err)
        }

        fn accuracy(&self, data: &Bound<'_, PyList>) -> PyResult<f64> {
            let points = extract_points::<i64>(data)?;
            self.model.accuracy(&points).map_err(to_py_err)
        }

        #[getter]
        fn weights(&self) -> Vec<f64> {
            self.model.weights().to_vec()
        }

        #[getter]
        fn bias(&self) -> f64 {
            self.model.bias()
        }
    }

    /// The Python module. Its name matches the `lib.name` in `Cargo.toml`.
    #[pymodule]
    fn classic_learners(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(manhattan_distance, m)?)?;
        m.add_function(wrap_pyfunction!(euclidean_distance, m)?)?;
        m.add_function(wrap_pyfunction!(normalize, m)?)?;
        m.add_class::<PyKnnDistance>()?;
        m.add_class::<PyKnnClassifier>()?;
        m.add_class::<PyKMeans>()?;
        m.add_class::<PyPerceptron>()?;
        Ok(())
    }
}
