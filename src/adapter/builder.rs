use serde_json::{json, Map, Value};
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use crate::adapter::device::{device_type, is_mobile, os_label};
use crate::adapter::params::{format_param, resolve_floor, resolve_sizes, video_targeting, ParamKey, Size, FLOOR_CURRENCY};
use crate::adapter::{HttpMethod, ServerRequest, ADAPTER_VERSION, BIDDER_CODE, DEFAULT_MIMES};
use crate::config::AdapterConfig;
use crate::model::{BidDescriptor, BidderRequestContext, Environment, MediaType};
use crate::openrtb::request::{Banner, Device, Imp, OutboundAdRequest, Regs, RegsExt, Site, User, UserExt};

pub const AUCTION_TYPE: u8 = 2;
pub const TMAX_MS: u64 = 3000;

/// 页面位置（解析自 pageUrl 配置或 referer）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLocation {
    pub href: String,
    pub hostname: String,
    pub search: String,
    pub protocol: String,
}

impl PageLocation {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        match Url::parse(raw) {
            Ok(url) => Self {
                href: url.as_str().to_string(),
                hostname: url.host_str().unwrap_or_default().to_string(),
                search: url.query().unwrap_or_default().to_string(),
                protocol: url.scheme().to_string(),
            },
            Err(e) => {
                debug!(page = raw, error = %e, "unparseable page url");
                Self { href: raw.to_string(), ..Self::default() }
            }
        }
    }

    pub fn is_secure(&self) -> bool {
        self.protocol.starts_with("https")
    }
}

/// 一次 build 调用内所有 descriptor 共享的信号
struct SharedSignals {
    location: PageLocation,
    referrer: String,
    device_type: u8,
    os: &'static str,
    mobile: bool,
    dnt: bool,
    secure: u8,
}

pub struct RequestBuilder<'a> {
    config: &'a AdapterConfig,
    env: &'a Environment,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(config: &'a AdapterConfig, env: &'a Environment) -> Self {
        Self { config, env }
    }

    /// 视频请求在前，banner 请求在后；同时满足两种格式的 descriptor 会各构建一份
    pub fn build_requests(&self, bids: &[BidDescriptor], ctx: &BidderRequestContext) -> Vec<ServerRequest> {
        let video_bids: Vec<&BidDescriptor> = bids.iter().filter(|bid| is_video_bid_valid(bid)).collect();
        let banner_bids: Vec<&BidDescriptor> = bids.iter().filter(|bid| is_banner_bid_valid(bid)).collect();

        let signals = self.shared_signals(ctx);
        let mut requests = Vec::with_capacity(video_bids.len() + banner_bids.len());

        for bid in video_bids {
            if let Some(request) = self.server_request(bid, MediaType::Video, &signals, ctx) {
                requests.push(request);
            }
        }
        for bid in banner_bids {
            if let Some(request) = self.server_request(bid, MediaType::Banner, &signals, ctx) {
                requests.push(request);
            }
        }

        info!(
            bids = bids.len(),
            requests = requests.len(),
            "built saambaa requests"
        );
        requests
    }

    fn server_request(
        &self,
        bid: &BidDescriptor,
        media_type: MediaType,
        signals: &SharedSignals,
        ctx: &BidderRequestContext,
    ) -> Option<ServerRequest> {
        let pubid = format_param(bid, media_type, ParamKey::PubId)?;
        let endpoint = match media_type {
            MediaType::Video => &self.config.video_endpoint,
            MediaType::Banner => &self.config.banner_endpoint,
        };
        let url = format!("{}{}", endpoint, pubid);
        debug!(bid_id = %bid.bid_id, %media_type, %url, "building request");

        Some(ServerRequest {
            method: HttpMethod::Post,
            url,
            data: self.request_data(bid, media_type, signals, ctx),
            bid_request: bid.clone(),
            media_type,
        })
    }

    fn shared_signals(&self, ctx: &BidderRequestContext) -> SharedSignals {
        let page = self.config.page_url.as_deref().filter(|p| !p.is_empty()).or(ctx.referer());
        let location = PageLocation::parse(page);
        let secure = u8::from(location.is_secure());
        let ua = self.env.user_agent.as_str();
        SharedSignals {
            referrer: self.env.top_referrer.clone().unwrap_or_default(),
            device_type: device_type(ua),
            os: os_label(ua),
            mobile: is_mobile(ua),
            dnt: self.env.do_not_track.enabled(),
            secure,
            location,
        }
    }

    fn request_data(
        &self,
        bid: &BidDescriptor,
        media_type: MediaType,
        signals: &SharedSignals,
        ctx: &BidderRequestContext,
    ) -> OutboundAdRequest {
        let sizes = resolve_sizes(bid, media_type);
        let floor = resolve_floor(bid, media_type);
        let placement = format_param(bid, media_type, ParamKey::Placement).unwrap_or_default();

        let imp = match media_type {
            MediaType::Video => {
                let first = sizes.first().copied().unwrap_or_default();
                let targeting = video_targeting(bid);
                (0..sizes.len())
                    .map(|index| Imp {
                        video: Some(video_object(first, &targeting)),
                        ..base_imp(index, placement, floor, signals.secure)
                    })
                    .collect()
            }
            MediaType::Banner => sizes
                .iter()
                .enumerate()
                .map(|(index, size)| Imp {
                    banner: Some(Banner { id: Uuid::new_v4().to_string(), pos: 0, w: size.w, h: size.h }),
                    ..base_imp(index, placement, floor, signals.secure)
                })
                .collect(),
        };

        OutboundAdRequest {
            id: bid.bid_id.clone(),
            at: AUCTION_TYPE,
            tmax: TMAX_MS,
            cur: vec![FLOOR_CURRENCY.to_string()],
            device: Device {
                language: self.env.language.split('-').next().unwrap_or_default().to_string(),
                dnt: u8::from(signals.dnt),
                devicetype: signals.device_type,
                js: 1,
                os: (media_type == MediaType::Video).then(|| signals.os.to_string()),
                w: self.env.screen_width,
                h: self.env.screen_height,
            },
            site: Site {
                page: signals.location.href.clone(),
                domain: signals.location.hostname.clone(),
                search: signals.location.search.clone(),
                referrer: signals.referrer.clone(),
                mobile: u8::from(signals.mobile),
                name: self.env.top_title.clone(),
            },
            imp,
            regs: Regs {
                ext: RegsExt {
                    coppa: self.config.coppa.then_some(1),
                    gdpr: ctx.gdpr_consent.as_ref().map(|gdpr| u8::from(gdpr.gdpr_applies)),
                },
            },
            user: User {
                ext: UserExt {
                    consent: ctx.gdpr_consent.as_ref().and_then(|gdpr| gdpr.consent_string.clone()),
                },
            },
        }
    }
}

fn base_imp(index: usize, placement: &str, floor: f64, secure: u8) -> Imp {
    Imp {
        id: index.to_string(),
        displaymanager: BIDDER_CODE.to_string(),
        displaymanagerver: ADAPTER_VERSION.to_string(),
        tag_id: placement.to_string(),
        bidfloor: floor,
        bidfloorcur: FLOOR_CURRENCY.to_string(),
        secure,
        video: None,
        banner: None,
    }
}

/// 默认视频对象，定向属性覆盖同名字段
fn video_object(first: Size, targeting: &Map<String, Value>) -> Map<String, Value> {
    let mut video = Map::new();
    video.insert("id".into(), json!(Uuid::new_v4().to_string()));
    video.insert("pos".into(), json!(0));
    if let Some(w) = first.w {
        video.insert("w".into(), json!(w));
    }
    if let Some(h) = first.h {
        video.insert("h".into(), json!(h));
    }
    video.insert("mimes".into(), json!(DEFAULT_MIMES));
    for (key, value) in targeting {
        video.insert(key.clone(), value.clone());
    }
    video
}

pub fn is_video_bid_valid(bid: &BidDescriptor) -> bool {
    bid.is_video()
        && format_param(bid, MediaType::Video, ParamKey::PubId).is_some()
        && format_param(bid, MediaType::Video, ParamKey::Placement).is_some()
}

pub fn is_banner_bid_valid(bid: &BidDescriptor) -> bool {
    bid.is_banner()
        && format_param(bid, MediaType::Banner, ParamKey::PubId).is_some()
        && format_param(bid, MediaType::Banner, ParamKey::Placement).is_some()
}
