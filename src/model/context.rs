// src/model/context.rs

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RefererInfo {
    #[serde(default)]
    pub referer: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GdprConsent {
    #[serde(default)]
    pub gdpr_applies: bool,
    #[serde(default)]
    pub consent_string: Option<String>,
}

/// 一次竞价周期内所有 descriptor 共享的上下文
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BidderRequestContext {
    #[serde(default)]
    pub referer_info: Option<RefererInfo>,
    #[serde(default)]
    pub gdpr_consent: Option<GdprConsent>,
}

impl BidderRequestContext {
    pub fn referer(&self) -> Option<&str> {
        self.referer_info.as_ref().and_then(|info| info.referer.as_deref())
    }
}

/// 浏览器遗留的三处 do-not-track 信号
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DoNotTrackSignals {
    /// `navigator.doNotTrack`，可能是 "1" 或 "yes"
    #[serde(default)]
    pub navigator: Option<String>,
    /// `window.doNotTrack`
    #[serde(default)]
    pub window: Option<String>,
    /// `navigator.msDoNotTrack`
    #[serde(default)]
    pub ms_navigator: Option<String>,
}

impl DoNotTrackSignals {
    pub fn enabled(&self) -> bool {
        let is = |signal: &Option<String>, value: &str| signal.as_deref() == Some(value);
        is(&self.navigator, "1")
            || is(&self.window, "1")
            || is(&self.ms_navigator, "1")
            || is(&self.navigator, "yes")
    }
}

/// 浏览环境快照
///
/// 所有 `Option` 字段都是 best-effort 读取：读取失败（跨域、无权限）时为 `None`，
/// 对应字段不会出现在请求里。
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub do_not_track: DoNotTrackSignals,
    #[serde(default)]
    pub screen_width: Option<u32>,
    #[serde(default)]
    pub screen_height: Option<u32>,
    #[serde(default)]
    pub top_title: Option<String>,
    #[serde(default)]
    pub top_referrer: Option<String>,
}

impl Environment {
    pub fn with_user_agent(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn do_not_track_from_any_location() {
        let mut dnt = DoNotTrackSignals::default();
        assert!(!dnt.enabled());

        dnt.navigator = Some("yes".into());
        assert!(dnt.enabled());

        let window_only = DoNotTrackSignals { window: Some("1".into()), ..Default::default() };
        assert!(window_only.enabled());

        let ms_only = DoNotTrackSignals { ms_navigator: Some("1".into()), ..Default::default() };
        assert!(ms_only.enabled());

        let unset = DoNotTrackSignals { navigator: Some("0".into()), ..Default::default() };
        assert!(!unset.enabled());
    }

    #[test]
    fn context_reads_prebid_json() {
        let ctx: BidderRequestContext = serde_json::from_str(
            r#"{"refererInfo": {"referer": "https://a.example/p?q=1"},
                "gdprConsent": {"gdprApplies": true, "consentString": "X"}}"#,
        )
        .unwrap();
        assert_eq!(ctx.referer(), Some("https://a.example/p?q=1"));
        assert_eq!(ctx.gdpr_consent.unwrap().consent_string.as_deref(), Some("X"));
    }
}
