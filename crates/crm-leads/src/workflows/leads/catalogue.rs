//! Closed option sets for the six qualification factors.
//!
//! Every option carries its display label, its point value and its evidence tone. Raw strings
//! coming from forms or tenant data are parsed case-insensitively against the labels and
//! rejected when they do not name an option.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::domain::QualificationFactorKind;

/// Editorial classification of how well a selected value is evidenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EvidenceTone {
    Verified,
    Assumed,
    Unknown,
    Invalid,
    /// No value selected yet.
    Neutral,
}

impl EvidenceTone {
    /// Weight used for confidence averaging and weakest-signal selection.
    pub const fn weight(self) -> u8 {
        match self {
            EvidenceTone::Verified => 3,
            EvidenceTone::Assumed => 2,
            EvidenceTone::Unknown | EvidenceTone::Neutral => 1,
            EvidenceTone::Invalid => 0,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EvidenceTone::Verified => "Verified",
            EvidenceTone::Assumed => "Assumed",
            EvidenceTone::Unknown => "Unknown",
            EvidenceTone::Invalid => "Invalid",
            EvidenceTone::Neutral => "Not set",
        }
    }
}

/// Raised when a raw value does not name an option of the factor's catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a recognized {} option", .factor.label())]
pub struct UnrecognizedOption {
    pub factor: QualificationFactorKind,
    pub value: String,
}

/// Shared behavior of every factor option enumeration.
pub trait FactorOption: Copy + Sized + 'static {
    const KIND: QualificationFactorKind;

    fn options() -> &'static [Self];
    fn label(self) -> &'static str;
    fn points(self) -> u8;
    fn tone(self) -> EvidenceTone;

    /// Unknown-equivalent options are the neutral default and do not count as qualification.
    fn is_meaningful(self) -> bool {
        !self.label().to_ascii_lowercase().contains("unknown")
    }

    fn parse(raw: &str) -> Result<Self, UnrecognizedOption> {
        let key = raw.trim().to_lowercase();
        Self::options()
            .iter()
            .copied()
            .find(|option| option.label().to_lowercase() == key)
            .ok_or_else(|| UnrecognizedOption {
                factor: Self::KIND,
                value: raw.trim().to_string(),
            })
    }
}

macro_rules! factor_options {
    (
        $(#[$meta:meta])*
        $name:ident for $kind:ident {
            $($variant:ident => ($label:literal, $points:literal, $tone:ident),)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl FactorOption for $name {
            const KIND: QualificationFactorKind = QualificationFactorKind::$kind;

            fn options() -> &'static [Self] {
                &[$($name::$variant,)+]
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            fn points(self) -> u8 {
                match self {
                    $($name::$variant => $points,)+
                }
            }

            fn tone(self) -> EvidenceTone {
                match self {
                    $($name::$variant => EvidenceTone::$tone,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnrecognizedOption;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                <$name as FactorOption>::parse(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

factor_options! {
    /// Budget availability, worth up to 25 points.
    BudgetAvailability for BudgetAvailability {
        Unknown => ("Unknown / not yet discussed", 0, Unknown),
        IndicativeRange => ("Indicative range mentioned", 15, Assumed),
        AllocatedAndApproved => ("Budget allocated and approved", 25, Verified),
        IdentifiedUnapproved => ("Budget identified but unapproved", 15, Assumed),
        NoDefinedBudget => ("No defined budget", 5, Invalid),
        ExplicitlyUnavailable => ("Budget explicitly unavailable", 0, Invalid),
    }
}

factor_options! {
    /// Readiness to spend, worth up to 20 points.
    ReadinessToSpend for ReadinessToSpend {
        Unknown => ("Unknown / unclear", 0, Unknown),
        InterestNoUrgency => ("Interest expressed, no urgency", 8, Assumed),
        ActivelyEvaluating => ("Actively evaluating solutions", 15, Assumed),
        DecisionInProgress => ("Internal decision in progress", 20, Verified),
        ReadyPendingFinalStep => ("Ready to proceed pending final step", 20, Verified),
        NotPlanningToSpend => ("Not planning to spend", 0, Invalid),
    }
}

factor_options! {
    /// Buying timeline, worth up to 15 points.
    BuyingTimeline for BuyingTimeline {
        Unknown => ("Unknown / not discussed", 0, Unknown),
        RoughTimeline => ("Rough timeline mentioned", 6, Assumed),
        TargetDateVerbal => ("Target date verbally confirmed", 12, Assumed),
        DecisionDateConfirmed => ("Decision date confirmed internally", 15, Verified),
        DateMissed => ("Date missed / repeatedly pushed", 0, Invalid),
        NoDefinedTimeline => ("No defined timeline", 0, Invalid),
    }
}

factor_options! {
    /// Problem severity, worth up to 20 points.
    ProblemSeverity for ProblemSeverity {
        Unknown => ("Unknown / not validated", 0, Unknown),
        MildInconvenience => ("Mild inconvenience", 2, Assumed),
        OperationalProblem => ("Recognized operational problem", 8, Assumed),
        CriticalImpact => ("Critical business impact", 20, Verified),
        ExecutivePriority => ("Executive-level priority", 20, Verified),
        Deprioritized => ("Problem acknowledged but deprioritized", 0, Invalid),
    }
}

factor_options! {
    /// Economic buyer access, worth up to 10 points.
    EconomicBuyer for EconomicBuyer {
        Unknown => ("Unknown / not identified", 0, Unknown),
        InfluencerIdentified => ("Influencer identified", 5, Assumed),
        IdentifiedNotEngaged => ("Buyer identified, not engaged", 5, Assumed),
        EngagedInDiscussion => ("Buyer engaged in discussion", 10, Verified),
        VerballySupportive => ("Buyer verbally supportive", 10, Verified),
        NotInvolved => ("Buyer explicitly not involved", 0, Invalid),
    }
}

factor_options! {
    /// Ideal customer profile fit, worth up to 10 points.
    IcpFit for IcpFit {
        Unknown => ("Unknown / not assessed", 0, Unknown),
        Partial => ("Partial ICP fit", 5, Assumed),
        Strong => ("Strong ICP fit", 10, Verified),
        OutOfProfileExploratory => ("Out-of-profile but exploratory", 5, Assumed),
        ClearlyOut => ("Clearly out of ICP", 0, Invalid),
    }
}

fn max_points<T: FactorOption>() -> u8 {
    T::options()
        .iter()
        .map(|option| option.points())
        .max()
        .unwrap_or(0)
}

/// Highest score any option of the factor can earn.
pub fn factor_max_points(kind: QualificationFactorKind) -> u8 {
    match kind {
        QualificationFactorKind::BudgetAvailability => max_points::<BudgetAvailability>(),
        QualificationFactorKind::ReadinessToSpend => max_points::<ReadinessToSpend>(),
        QualificationFactorKind::BuyingTimeline => max_points::<BuyingTimeline>(),
        QualificationFactorKind::ProblemSeverity => max_points::<ProblemSeverity>(),
        QualificationFactorKind::EconomicBuyer => max_points::<EconomicBuyer>(),
        QualificationFactorKind::IcpFit => max_points::<IcpFit>(),
    }
}
