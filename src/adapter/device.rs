//! 基于 User-Agent 的设备嗅探

use once_cell::sync::Lazy;

pub const DEVICE_TYPE_MOBILE: u8 = 4;
pub const DEVICE_TYPE_CONNECTED_TV: u8 = 3;
pub const DEVICE_TYPE_PERSONAL_COMPUTER: u8 = 2;

const MOBILE_SIGNATURES: [&str; 5] = ["ios", "ipod", "ipad", "iphone", "android"];

const CTV_SIGNATURES: [&str; 12] = [
    "smarttv", "smart-tv", "hbbtv", "appletv", "googletv", "hdmi", "netcast.tv", "viera", "nettv",
    "roku", "sonydtv", "inettvbrowser",
];

/// 需要完整单词匹配的 CTV 标识
const CTV_WORDS: [&str; 2] = ["dtv", "tv"];

struct OsSignature {
    label: &'static str,
    needles: &'static [&'static str],
}

/// 顺序即优先级，先匹配先返回；爬虫放在最后兜底
static OS_SIGNATURES: Lazy<Vec<OsSignature>> = Lazy::new(|| {
    vec![
        OsSignature { label: "Android", needles: &["Android"] },
        OsSignature { label: "iOS", needles: &["iPhone", "iPad", "iPod"] },
        OsSignature { label: "Mac OS X", needles: &["Mac OS X"] },
        OsSignature { label: "Mac OS", needles: &["MacPPC", "MacIntel", "Mac_PowerPC", "Macintosh"] },
        OsSignature { label: "Linux", needles: &["Linux", "X11"] },
        OsSignature { label: "Windows 10", needles: &["Windows 10.0", "Windows NT 10.0"] },
        OsSignature { label: "Windows 8.1", needles: &["Windows 8.1", "Windows NT 6.3"] },
        OsSignature { label: "Windows 8", needles: &["Windows 8", "Windows NT 6.2"] },
        OsSignature { label: "Windows 7", needles: &["Windows 7", "Windows NT 6.1"] },
        OsSignature { label: "Windows Vista", needles: &["Windows NT 6.0"] },
        OsSignature { label: "Windows Server 2003", needles: &["Windows NT 5.2"] },
        OsSignature { label: "Windows XP", needles: &["Windows NT 5.1", "Windows XP"] },
        OsSignature { label: "UNIX", needles: &["UNIX"] },
        OsSignature {
            label: "Search Bot",
            needles: &["nuhk", "Googlebot", "Yammybot", "Openbot", "Slurp", "MSNBot", "Ask Jeeves/Teoma", "ia_archiver"],
        },
    ]
});

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// 在 `haystack` 里按单词边界查找 `word`（等价于 `\bword\b`）
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + word.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

pub fn is_mobile(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_SIGNATURES.iter().any(|sig| ua.contains(sig))
}

pub fn is_connected_tv(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    CTV_SIGNATURES.iter().any(|sig| ua.contains(sig)) || CTV_WORDS.iter().any(|word| contains_word(&ua, word))
}

/// OpenRTB devicetype：4 = 手机，3 = 联网电视，2 = 其它
pub fn device_type(user_agent: &str) -> u8 {
    if is_mobile(user_agent) {
        DEVICE_TYPE_MOBILE
    } else if is_connected_tv(user_agent) {
        DEVICE_TYPE_CONNECTED_TV
    } else {
        DEVICE_TYPE_PERSONAL_COMPUTER
    }
}

pub fn os_label(user_agent: &str) -> &'static str {
    OS_SIGNATURES
        .iter()
        .find(|sig| sig.needles.iter().any(|needle| user_agent.contains(needle)))
        .map(|sig| sig.label)
        .unwrap_or("unknown")
}
