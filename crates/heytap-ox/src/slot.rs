//! Ad slot templates and the per-slot create request.

use std::collections::BTreeMap;

/// Ad slot families the template catalog covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Self-rendered native placement.
    Native,
    /// Rewarded video placement.
    Rewarded,
}

impl SlotKind {
    /// Segment embedded in generated slot names. Native slots omit it, so
    /// only non-native kinds ever render theirs.
    #[must_use]
    pub fn name_segment(self) -> &'static str {
        match self {
            SlotKind::Native => "原生",
            SlotKind::Rewarded => "激励",
        }
    }
}

/// Static field set a template contributes to every create call. Fields the
/// platform does not expect for a given kind stay `None` and are never sent.
#[derive(Debug, Clone, Default)]
pub struct SlotConfig {
    /// Placement scene, `4` native, `5` rewarded video.
    pub pos_scene: u32,
    /// Fixed creative type code per scene.
    pub dev_crt_type: &'static str,
    /// Creative type list for self-rendered native slots.
    pub ad_multi_dev_crt_types: Option<&'static str>,
    /// `3` selects self-rendering 2.0.
    pub render_mode: Option<u32>,
    /// `1` landscape, `2` portrait.
    pub video_play_direction: Option<u32>,
    /// `0` muted, `1` sound on.
    pub open_voice_style: Option<u32>,
    /// End-page trigger set, `3` checks everything.
    pub multi_end_page_styles: Option<u32>,
    /// `1` when a target price applies, `0` when it is switched off.
    pub target_price_open: Option<u32>,
    /// `1` real-time bidding. Mutually exclusive with a target price.
    pub bidding_pattern: Option<u32>,
}

/// One of the four catalog templates slots are created from.
#[derive(Debug, Clone)]
pub struct SlotTemplate {
    /// Catalog display name.
    pub name: &'static str,
    pub kind: SlotKind,
    pub config: SlotConfig,
}

impl SlotTemplate {
    /// Native placement with a fixed floor price.
    #[must_use]
    pub fn native_fixed() -> Self {
        Self {
            name: "原生-固定价",
            kind: SlotKind::Native,
            config: SlotConfig {
                pos_scene: 4,
                dev_crt_type: "19",
                ad_multi_dev_crt_types: Some("100,6,7,8,11,47,46"),
                render_mode: Some(3),
                target_price_open: Some(1),
                ..SlotConfig::default()
            },
        }
    }

    /// Native placement auctioned in real time.
    #[must_use]
    pub fn native_bidding() -> Self {
        Self {
            name: "原生-bidding",
            kind: SlotKind::Native,
            config: SlotConfig {
                pos_scene: 4,
                dev_crt_type: "19",
                ad_multi_dev_crt_types: Some("100,6,7,8,11,47,46"),
                render_mode: Some(3),
                target_price_open: Some(0),
                bidding_pattern: Some(1),
                ..SlotConfig::default()
            },
        }
    }

    /// Rewarded video with a fixed floor price.
    #[must_use]
    pub fn rewarded_fixed() -> Self {
        Self {
            name: "激励-固定价",
            kind: SlotKind::Rewarded,
            config: SlotConfig {
                pos_scene: 5,
                dev_crt_type: "45",
                video_play_direction: Some(2),
                open_voice_style: Some(0),
                multi_end_page_styles: Some(3),
                target_price_open: Some(1),
                ..SlotConfig::default()
            },
        }
    }

    /// Rewarded video auctioned in real time.
    #[must_use]
    pub fn rewarded_bidding() -> Self {
        Self {
            name: "激励-bidding",
            kind: SlotKind::Rewarded,
            config: SlotConfig {
                pos_scene: 5,
                dev_crt_type: "45",
                video_play_direction: Some(2),
                open_voice_style: Some(0),
                multi_end_page_styles: Some(3),
                target_price_open: Some(0),
                bidding_pattern: Some(1),
                ..SlotConfig::default()
            },
        }
    }

    /// The full fixed catalog, in menu order.
    #[must_use]
    pub fn catalog() -> [SlotTemplate; 4] {
        [
            Self::native_fixed(),
            Self::native_bidding(),
            Self::rewarded_fixed(),
            Self::rewarded_bidding(),
        ]
    }

    /// Bidding templates auction freely and must not carry a target price.
    #[must_use]
    pub fn is_bidding(&self) -> bool {
        self.config.bidding_pattern.is_some()
    }
}

/// One create-call payload: a template config plus the generated name and
/// the batch's price decision.
#[derive(Debug, Clone)]
pub struct SlotRequest {
    /// Generated slot name, unique within a batch by construction.
    pub pos_name: String,
    pub config: SlotConfig,
    /// Floor price in yuan; absent for bidding slots.
    pub target_price: Option<u32>,
}

impl SlotRequest {
    /// Wire params for the create endpoint. Unset fields are left out
    /// entirely rather than sent as empty strings, so the signed set and the
    /// transmitted set stay identical.
    #[must_use]
    pub fn params(&self, media_id: &str) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("appId".to_string(), media_id.to_string());
        params.insert("posName".to_string(), self.pos_name.clone());
        params.insert("posScene".to_string(), self.config.pos_scene.to_string());
        params.insert("devCrtType".to_string(), self.config.dev_crt_type.to_string());
        if let Some(v) = self.config.ad_multi_dev_crt_types {
            params.insert("adMultiDevCrtTypes".to_string(), v.to_string());
        }
        if let Some(v) = self.config.render_mode {
            params.insert("renderMode".to_string(), v.to_string());
        }
        if let Some(v) = self.config.video_play_direction {
            params.insert("videoPlayDirection".to_string(), v.to_string());
        }
        if let Some(v) = self.config.open_voice_style {
            params.insert("openVoiceStyle".to_string(), v.to_string());
        }
        if let Some(v) = self.config.multi_end_page_styles {
            params.insert("multiEndPageStyles".to_string(), v.to_string());
        }
        if let Some(v) = self.config.target_price_open {
            params.insert("targetPriceOpen".to_string(), v.to_string());
        }
        if let Some(v) = self.config.bidding_pattern {
            params.insert("biddingPattern".to_string(), v.to_string());
        }
        if let Some(v) = self.target_price {
            params.insert("targetPrice".to_string(), v.to_string());
        }
        params
    }
}
