use labo_recommender::evaluate::Scoring;
use labo_recommender::model_selection::{cross_val_score, grid_search, ParamGrid};
use labo_recommender::{Bag, BagRecommender, DistanceMetric, LaboConfig};

fn main() -> labo_recommender::Result<()> {
    // bags of tests requested together
    let bags: Vec<Bag> = [
        &["glucose", "sodium", "potassium", "creatinine"][..],
        &["glucose", "sodium", "chloride"],
        &["sodium", "potassium", "chloride", "bicarbonate"],
        &["hemoglobin", "platelets", "wbc"],
        &["hemoglobin", "hematocrit", "platelets"],
        &["hemoglobin", "wbc", "hematocrit"],
        &["pt", "inr", "ptt"],
        &["pt", "inr"],
        &["alt", "ast", "bilirubin"],
        &["alt", "ast", "albumin"],
    ]
    .iter()
    .map(|bag| bag.iter().map(|s| s.to_string()).collect())
    .collect();

    // LABO_K, LABO_METRIC, LABO_CV, ... override the defaults
    let mut config = LaboConfig::from_env()?;
    config.recommender.k = config.recommender.k.min(3);
    config.validation.n_splits = config.validation.n_splits.min(bags.len());

    let mut recommender = BagRecommender::with_params(config.recommender);
    recommender.fit(&bags)?;
    let recommended = recommender.predict(&[vec!["glucose", "sodium"], vec!["hemoglobin"]], 3)?;
    println!("Recommendations:");
    for (query, items) in [["glucose", "sodium"].join(", "), "hemoglobin".to_string()]
        .iter()
        .zip(&recommended)
    {
        println!("  [{query}] -> {items:?}");
    }

    let scores = cross_val_score(&mut recommender, &bags, &Scoring::MeanAveragePrecision, &config.validation)?;
    println!("MAP per fold: {:?}", scores.scores);
    println!("MAP: {:.3} +/- {:.3}", scores.mean(), scores.std());

    let grid = ParamGrid::new()
        .with("k", [1usize, 2, 3])
        .with("metric", [DistanceMetric::Jaccard, DistanceMetric::Cosine]);
    let result = grid_search(&grid, &mut recommender, &bags, &Scoring::MeanAverageF1, &config.validation)?;
    println!("best params: {:?} (F1 {:.3})", result.best_params, result.best_mean_result);
    Ok(())
}
