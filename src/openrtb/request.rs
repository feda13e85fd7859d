use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 发往 endpoint 的 OpenRTB 风格请求体，每个 descriptor（每种格式）一份
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutboundAdRequest {
    pub id: String,
    /// 竞价类型，固定 2（第二高价）
    pub at: u8,
    pub tmax: u64,
    pub cur: Vec<String>,
    pub device: Device,
    pub site: Site,
    pub imp: Vec<Imp>,
    pub regs: Regs,
    pub user: User,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Device {
    // endpoint 读取的就是这个拼写
    #[serde(rename = "langauge")]
    pub language: String,
    pub dnt: u8,
    pub devicetype: u8,
    pub js: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Site {
    pub page: String,
    pub domain: String,
    pub search: String,
    #[serde(rename = "ref")]
    pub referrer: String,
    pub mobile: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// 单个广告展示机会，每个解析出的尺寸一条
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Imp {
    pub id: String,
    pub displaymanager: String,
    pub displaymanagerver: String,
    #[serde(rename = "tagId")]
    pub tag_id: String,
    pub bidfloor: f64,
    pub bidfloorcur: String,
    pub secure: u8,
    /// 视频对象：默认字段与调用方定向属性合并后的结果
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Banner>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Banner {
    pub id: String,
    pub pos: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Regs {
    pub ext: RegsExt,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RegsExt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coppa: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr: Option<u8>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct User {
    pub ext: UserExt,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserExt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<String>,
}

impl Imp {
    /// 视频对象里的宽高（来自合并后的 video map）
    pub fn video_size(&self) -> (Option<u64>, Option<u64>) {
        match &self.video {
            Some(video) => (
                video.get("w").and_then(Value::as_u64),
                video.get("h").and_then(Value::as_u64),
            ),
            None => (None, None),
        }
    }
}
