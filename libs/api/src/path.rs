pub const UPLOAD: &str = "/api/upload";
pub const VIDEOS: &str = "/api/videos";
pub const WS: &str = "/ws";

pub fn play(key: &str) -> String {
    format!("/api/play/{}", key)
}

pub fn transcribe(filename: &str) -> String {
    format!("/api/transcribe/{}", filename)
}

pub fn transcribe_status(job_name: &str) -> String {
    format!("/api/transcribe/status/{}", job_name)
}

pub fn video_info(filename: &str) -> String {
    format!("/api/video-info/{}", filename)
}
