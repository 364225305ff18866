use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficDto {
    pub flows: Vec<FlowDto>,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(tag = "type")]
pub enum FlowDto {
    #[serde(rename = "TT")]
    Tt(TtFlowDto),

    #[serde(rename = "AVB")]
    Avb(AvbFlowDto),
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtFlowDto {
    pub id: u64,
    pub src: String,
    pub dst: String,
    pub period: f64,
    pub deadline: f64,
    pub size: u32,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvbFlowDto {
    pub id: u64,
    pub src: String,
    pub dst: String,
    pub bandwidth: f64,
    pub deadline: f64,
}
