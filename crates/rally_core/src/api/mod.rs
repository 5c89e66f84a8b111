pub mod json_api;

pub use json_api::{
    analysis_result_schema, analyze_rally_json, recommend_shot_json, AnalyzeRallyRequest,
    CourtPosition, ShotQueryRequest, ShotQueryResponse,
};
