use classic_learners::dataset::DelimitedLoader;
use classic_learners::distance::{manhattan_distance, KnnDistance};
use classic_learners::kmeans::{self, KMeans, RandomPartition};
use classic_learners::knn::{self, KnnClassifier};
use classic_learners::perceptron::{BinaryLabels, Perceptron};
use classic_learners::{DataPoint, MlError};

fn scenario() -> Vec<DataPoint<f64, String>> {
    DelimitedLoader::knn_csv(',', 2)
        .parse("x,y,class\n0,0,A\n0,1,A\n10,10,B\n10,11,B\n")
        .unwrap()
}

#[test]
fn knn_scenario_from_loaded_csv() {
    let data = scenario();
    assert_eq!(data.len(), 4);
    let metric = manhattan_distance::<f64>;
    assert_eq!(knn::predict(&[0.0, 0.5], &data, 1, &metric).unwrap(), "A");
    assert_eq!(knn::predict(&[10.0, 10.5], &data, 1, &metric).unwrap(), "B");
}

#[test]
fn kmeans_scenario_from_loaded_csv() {
    let data = scenario();
    let result = kmeans::cluster(&data, 2, &KnnDistance::Manhattan).unwrap();
    assert!(result.iterations <= 3);
    let groups: Vec<Vec<&str>> = result
        .assignment
        .iter()
        .map(|g| g.iter().map(|p| p.label.as_str()).collect())
        .collect();
    assert_eq!(groups, vec![vec!["A", "A"], vec!["B", "B"]]);
}

#[test]
fn normalized_sweep_over_blobs() {
    // Two well separated blobs on very different feature scales
    let mut text = String::from("a;b;label\n");
    for i in 0..20 {
        let offset = i as f64 * 0.1;
        text.push_str(&format!("{};{};low\n", 1.0 + offset, 100.0 + offset * 10.0));
        text.push_str(&format!("{};{};high\n", 5.0 + offset, 900.0 + offset * 10.0));
    }
    let loader = DelimitedLoader {
        delimiter: ';',
        label_column: None,
        has_header: true,
    };
    let data: Vec<DataPoint<f64, String>> = loader.parse(&text).unwrap();
    assert_eq!(data.len(), 40);

    let normalized = knn::normalize(&data).unwrap();
    let (train, test) = knn::split_seeded(&normalized, 0.7, 2024).unwrap();
    assert_eq!(train.len(), 28);
    assert_eq!(test.len(), 12);

    for k in [1, 3, 5, 7, 9, 11] {
        let mut classifier = KnnClassifier::new(k, KnnDistance::Manhattan).unwrap();
        classifier.fit(train.clone()).unwrap();
        let score = classifier.score(&test).unwrap();
        assert_eq!(score, 1.0, "k={} scored {}", k, score);
    }
}

#[test]
fn kmeans_random_and_label_seeded_agree_on_separated_data() {
    let loader = DelimitedLoader::points_semicolon();
    let data: Vec<DataPoint<f64, i64>> = loader
        .parse("1;1;1\n1.5;2;1\n2;1;1\n20;20;2\n21;19;2\n19;21;2\n")
        .unwrap();
    let seeded = kmeans::cluster(&data, 2, &KnnDistance::Manhattan).unwrap();
    assert_eq!(seeded.cluster_sizes(), vec![3, 3]);

    let random = KMeans::new(2)
        .with_initialization(RandomPartition { seed: 5 })
        .cluster(&data, &KnnDistance::Manhattan)
        .unwrap();
    let mut sizes = random.cluster_sizes();
    sizes.sort();
    assert_eq!(sizes, vec![3, 3]);
    for group in random.assignment.iter() {
        assert!(group.iter().all(|p| p.label == group[0].label));
    }
}

#[test]
fn perceptron_learns_loaded_points() {
    let data: Vec<DataPoint<f64, i64>> = DelimitedLoader::points_semicolon()
        .parse("2;1;1\n1;3;1\n6;5;2\n7;8;2\n0;0;1\n8;6;2\n")
        .unwrap();
    let mut model = Perceptron::new(2, 0.1, BinaryLabels::new(1, 2).unwrap()).unwrap();
    model.train_epochs(&data, 100).unwrap();
    assert_eq!(model.accuracy(&data).unwrap(), 1.0);
}

#[test]
fn errors_surface_through_the_public_api() {
    let data = scenario();
    let err = knn::predict(&[1.0], &data, 1, &KnnDistance::Manhattan).unwrap_err();
    assert!(matches!(err, MlError::DimensionMismatch { expected: 1, actual: 2 }));
    assert_eq!(err.to_string(), "Dimension mismatch: expected 1, got 2");

    let err = kmeans::cluster(&data, 1, &KnnDistance::Manhattan).unwrap_err();
    assert_eq!(err.to_string(), "2 distinct labels cannot seed 1 clusters");
}
