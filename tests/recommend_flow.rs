use std::time::Duration;

use labo_recommender::dataset::events::{bags_from_events, LabEvent};
use labo_recommender::dataset::BagDataset;
use labo_recommender::evaluate::{mean_average_f1, mean_average_precision, Scorer, Scoring};
use labo_recommender::model_selection::{cross_val_score, grid_search, ParamGrid};
use labo_recommender::{
    Bag, BagRecommender, DistanceMetric, IndexKind, LaboConfig, PopularityRecommender,
    RecommenderParams, ValidationConfig,
};

const PANELS: [&[&str]; 4] = [
    &["sodium", "potassium", "chloride", "bicarbonate", "creatinine"],
    &["hemoglobin", "hematocrit", "platelets", "wbc"],
    &["alt", "ast", "bilirubin", "albumin"],
    &["pt", "inr", "ptt"],
];

/// Bags drawn from four disjoint panels, each a rotation of its panel
fn corpus() -> Vec<Bag> {
    (0..48)
        .map(|i| {
            let panel = PANELS[i % PANELS.len()];
            let mut bag: Bag = panel.iter().map(|item| item.to_string()).collect();
            bag.rotate_left((i / PANELS.len()) % panel.len());
            bag
        })
        .collect()
}

#[test]
fn fit_predict_and_score_held_out_pairs() {
    let dataset = BagDataset::from_corpus(&corpus(), 0.25, Some(11)).unwrap();
    assert_eq!(dataset.train_bags.len(), 36);

    let mut recommender = BagRecommender::with_params(RecommenderParams::new(3, DistanceMetric::Jaccard));
    recommender.fit(&dataset.train_bags).unwrap();
    let predicted = recommender.predict(&dataset.test_bags_x, 3).unwrap();
    assert_eq!(predicted.len(), dataset.test_bags_x.len());

    for (query, recommended) in dataset.test_bags_x.iter().zip(&predicted) {
        assert!(recommended.len() <= 3);
        assert!(recommended.iter().all(|item| !query.contains(item)));
    }

    let map = mean_average_precision(&dataset.test_bags_y, &predicted).unwrap();
    let f1 = mean_average_f1(&dataset.test_bags_y, &predicted).unwrap();
    // panels never mix, so every recommendation completes the query's panel
    assert!(map > 0.99, "got MAP {map}");
    assert!((0.0..=1.0).contains(&f1));
}

#[test]
fn neighbors_beat_popularity() {
    let corpus = corpus();
    let config = ValidationConfig::new(4, 3).with_random_state(7);

    let mut neighbors = BagRecommender::with_params(RecommenderParams::new(4, DistanceMetric::Jaccard));
    let knn = cross_val_score(&mut neighbors, &corpus, &Scoring::MeanAveragePrecision, &config).unwrap();

    let mut popular = PopularityRecommender::new();
    let baseline = cross_val_score(&mut popular, &corpus, &Scoring::MeanAveragePrecision, &config).unwrap();

    assert_eq!(knn.len(), 4);
    assert!(knn.mean() > baseline.mean());
}

#[test]
fn grid_search_over_index_and_k() {
    let corpus = corpus();
    let grid = ParamGrid::new()
        .with("index", [IndexKind::BruteForce, IndexKind::Inverted])
        .with("k", [2usize, 6]);
    let config = ValidationConfig::new(3, 3);
    let mut recommender = BagRecommender::new();
    let result = grid_search(&grid, &mut recommender, &corpus, &Scoring::MeanAverageF1, &config).unwrap();

    assert_eq!(result.params.len(), 4);
    // both indexes return identical neighbors under Jaccard
    assert_eq!(result.raw_results[0], result.raw_results[2]);
    assert_eq!(result.raw_results[1], result.raw_results[3]);
    assert!(result.best_index < 2);
    assert_eq!(result.best_mean_result, result.mean_results[result.best_index]);
}

#[test]
fn custom_scorer_closure() {
    let hit_rate = |y_true: &[Bag], y_pred: &[Bag]| -> labo_recommender::Result<f64> {
        let hits = y_true
            .iter()
            .zip(y_pred)
            .filter(|(truth, pred)| pred.first().is_some_and(|p| truth.contains(p)))
            .count();
        Ok(hits as f64 / y_true.len() as f64)
    };
    let corpus = corpus();
    let mut recommender = BagRecommender::with_params(RecommenderParams::new(3, DistanceMetric::Cosine));
    let scores = cross_val_score(&mut recommender, &corpus, &hit_rate, &ValidationConfig::new(3, 1)).unwrap();
    assert!(scores.mean() > 0.5);
    assert!(hit_rate.score(&[vec!["a".into()]], &[vec!["a".into()]]).unwrap() == 1.0);
}

#[test]
fn events_to_recommendations() {
    let mut events = Vec::new();
    for subject in 0..6u64 {
        let t = subject as i64 * 7200;
        for item in ["sodium", "potassium", "creatinine"] {
            events.push(LabEvent::new(subject, t + 5, item));
        }
        events.push(LabEvent::new(subject, t + 4000, "lactate"));
    }
    let bags = bags_from_events(events, Duration::from_secs(3600)).unwrap();
    assert_eq!(bags.len(), 1);

    let config = LaboConfig::from_json_str(r#"{ "recommender": { "k": 1 } }"#).unwrap();
    let mut recommender = BagRecommender::with_params(config.recommender);
    recommender.fit(&bags).unwrap();
    let out = recommender.predict(&[vec!["sodium"]], 5).unwrap();
    assert_eq!(out[0], vec!["creatinine", "potassium"]);
}
