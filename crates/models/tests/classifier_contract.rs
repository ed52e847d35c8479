//! End-to-end classifier behavior on generated data.

use datagen::{GeneratorConfig, SyntheticDataGenerator};
use models::{
    Classifier, ForestConfig, ModelError, ModelSpec, RiskClassifier, StandardScaler,
};
use types::{FeatureRow, ModelType, TestParameters, Verdict};

fn dataset(n: usize, seed: u64) -> (Vec<FeatureRow>, Vec<u8>) {
    SyntheticDataGenerator::new(GeneratorConfig::default(), seed).generate_training(n)
}

fn quick(model_type: ModelType) -> RiskClassifier {
    match model_type {
        ModelType::RandomForest => RiskClassifier::with_spec(ModelSpec::RandomForest(
            ForestConfig::default().with_n_estimators(20),
        )),
        ModelType::LogisticRegression => RiskClassifier::new(model_type),
    }
}

#[test]
fn predict_before_training_is_rejected() {
    for t in ModelType::ALL {
        let clf = RiskClassifier::new(t);
        let err = clf.predict(&TestParameters::default()).unwrap_err();
        assert!(matches!(err, ModelError::NotTrained));
        assert!(clf.predict_batch(&[[25.0, 50.0, 5.0, 1013.0]]).is_err());
    }
}

#[test]
fn single_class_training_is_rejected() {
    let (x, _) = dataset(100, 1);
    let mut clf = RiskClassifier::new(ModelType::LogisticRegression);
    let err = clf.train(&x, &vec![1u8; x.len()], 0.2).unwrap_err();
    assert!(matches!(err, ModelError::DegenerateLabelSet { classes: 1 }));
}

#[test]
fn non_finite_features_are_rejected() {
    let (x, y) = dataset(400, 5);
    for t in ModelType::ALL {
        let mut clf = quick(t);
        clf.train(&x, &y, 0.2).unwrap();

        let err = clf
            .predict(&TestParameters::new(f64::NAN, 50.0, 5.0, 1013.0))
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::NonFiniteFeature { feature: "temperature", .. }
        ));
        let err = clf
            .predict(&TestParameters::new(25.0, 50.0, 5.0, f64::NEG_INFINITY))
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::NonFiniteFeature { feature: "pressure", .. }
        ));

        let batch = [[25.0, 50.0, 5.0, 1013.0], [25.0, f64::INFINITY, 5.0, 1013.0]];
        assert!(matches!(
            clf.predict_batch(&batch),
            Err(ModelError::NonFiniteFeature { feature: "humidity", .. })
        ));
    }

    let mut poisoned = x.clone();
    poisoned[3][2] = f64::NAN;
    let mut clf = RiskClassifier::new(ModelType::LogisticRegression);
    assert!(matches!(
        clf.train(&poisoned, &y, 0.2),
        Err(ModelError::NonFiniteFeature { feature: "vibration", .. })
    ));
    assert!(!clf.is_trained());
}

#[test]
fn trained_predictions_follow_the_native_decision() {
    let (x, y) = dataset(600, 7);
    for t in ModelType::ALL {
        let mut clf = quick(t);
        let metrics = clf.train(&x, &y, 0.2).unwrap();
        assert!((0.0..=1.0).contains(&metrics.accuracy));
        assert!(metrics.cv_std >= 0.0);

        let model = clf.trained().unwrap();
        for row in x.iter().take(100) {
            let p = clf.predict_row(row).unwrap();
            assert!((0.0..=1.0).contains(&p.risk_score));
            assert!(p.confidence >= 0.5 - 1e-9);
            let native = model.estimator.predict(&model.scaler.transform_row(row));
            assert_eq!(p.prediction, Verdict::from_label(native));
        }
    }
}

#[test]
fn save_then_load_reproduces_predictions() {
    let (x, y) = dataset(400, 3);
    let dir = tempfile::tempdir().unwrap();

    for t in ModelType::ALL {
        let mut clf = quick(t);
        clf.train(&x, &y, 0.2).unwrap();
        let path = dir.path().join("nested").join(format!("{}.json", t));
        clf.save(&path).unwrap();
        assert!(path.exists());

        let restored = RiskClassifier::open(&path).unwrap();
        assert_eq!(restored.model_type(), t);
        assert_eq!(restored.metrics(), clf.metrics());
        for row in x.iter().take(50) {
            assert_eq!(restored.predict_row(row).unwrap(), clf.predict_row(row).unwrap());
        }
    }
}

#[test]
fn load_reports_missing_and_corrupt_files() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.json");
    assert!(matches!(
        RiskClassifier::open(&missing),
        Err(ModelError::ModelFileNotFound(_))
    ));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{ not json").unwrap();
    assert!(matches!(
        RiskClassifier::open(&garbage),
        Err(ModelError::Corrupt { .. })
    ));
}

#[test]
fn load_rejects_inconsistent_bundle() {
    let (x, y) = dataset(300, 11);
    let mut clf = quick(ModelType::LogisticRegression);
    clf.train(&x, &y, 0.2).unwrap();

    let mut bundle = clf.trained().unwrap().clone();
    bundle.feature_names.reverse();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("swapped.json");
    std::fs::write(&path, serde_json::to_string(&bundle).unwrap()).unwrap();

    let mut target = RiskClassifier::new(ModelType::LogisticRegression);
    assert!(matches!(target.load(&path), Err(ModelError::Corrupt { .. })));
    assert!(!target.is_trained());
}

#[test]
fn from_parts_is_immediately_usable() {
    let (x, y) = dataset(300, 5);
    let scaler = StandardScaler::fit(&x).unwrap();
    let spec = ModelSpec::default_for(ModelType::LogisticRegression);
    let estimator = spec.fit(&scaler.transform(&x), &y, 0).unwrap();
    let metrics = types::TrainingMetrics {
        accuracy: 1.0,
        precision: 1.0,
        recall: 1.0,
        f1_score: 1.0,
        cv_mean: 1.0,
        cv_std: 0.0,
    };
    let clf = RiskClassifier::from_parts(spec, scaler, estimator, metrics);
    assert!(clf.is_trained());
    assert_eq!(clf.feature_importance().unwrap().len(), 4);
    assert!(clf.predict(&TestParameters::new(65.0, 90.0, 30.0, 850.0)).is_ok());
}
