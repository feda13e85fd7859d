pub mod bid;
pub mod context;

pub use bid::{
    BannerMediaType, BidDescriptor, BidParams, FloorInfo, FloorProvider, FloorQuery, FormatParams,
    MediaType, MediaTypes, SizeInput, StaticFloors, VideoMediaType, VideoParams,
};
pub use context::{BidderRequestContext, DoNotTrackSignals, Environment, GdprConsent, RefererInfo};
