use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Upload {
    pub video_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Video {
    pub key: String,
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Transcribe {
    pub job_name: String,
    pub status: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VideoInfo {
    pub video_name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Message {
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Error {
    pub error: String,
}
