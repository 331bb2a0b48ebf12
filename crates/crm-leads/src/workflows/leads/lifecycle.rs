use serde::{Deserialize, Deserializer, Serialize};

/// Pipeline status of a lead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Nurture,
    Qualified,
    Converted,
    Lost,
    Disqualified,
}

impl LeadStatus {
    pub const ORDERED: [LeadStatus; 7] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Nurture,
        LeadStatus::Qualified,
        LeadStatus::Converted,
        LeadStatus::Lost,
        LeadStatus::Disqualified,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::Nurture => "Nurture",
            LeadStatus::Qualified => "Qualified",
            LeadStatus::Converted => "Converted",
            LeadStatus::Lost => "Lost",
            LeadStatus::Disqualified => "Disqualified",
        }
    }

    pub fn try_parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ORDERED
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(raw))
    }

    /// Unrecognized or empty names fall back to `New`.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(Self::try_parse).unwrap_or_default()
    }

    pub const fn is_closed(self) -> bool {
        matches!(
            self,
            LeadStatus::Converted | LeadStatus::Lost | LeadStatus::Disqualified
        )
    }

    /// One-based position in the pipeline.
    pub fn order(self) -> usize {
        Self::ORDERED
            .iter()
            .position(|status| *status == self)
            .map(|index| index + 1)
            .unwrap_or(1)
    }

    pub fn can_transition_to(self, target: LeadStatus) -> bool {
        use LeadStatus::*;

        match self {
            New => matches!(
                target,
                New | Contacted | Nurture | Qualified | Lost | Disqualified
            ),
            Contacted => matches!(target, Contacted | Nurture | Qualified | Lost | Disqualified),
            Nurture => matches!(target, Nurture | Contacted | Qualified | Lost | Disqualified),
            Qualified => matches!(target, Qualified | Nurture | Lost | Disqualified | Converted),
            Lost => matches!(target, Lost | Contacted | Nurture | Qualified),
            Disqualified => matches!(target, Disqualified | Contacted | Nurture | Qualified),
            Converted => target == Converted,
        }
    }
}

impl<'de> Deserialize<'de> for LeadStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Self::parse_or_default(raw.as_deref()))
    }
}
