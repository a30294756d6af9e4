use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Error returned when a string is not part of a closed vocabulary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);

/// Declares a closed string vocabulary with its wire spelling.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant,)+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant(other.to_string())),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}


string_enum!(
    DrinkingHabit {
        Never => "Never",
        Socially => "Socially",
        Frequently => "Frequently",
        Sober => "Sober",
    }
);

string_enum!(
    MaritalStatus {
        NeverMarried => "Never Married",
        Divorced => "Divorced",
        Widowed => "Widowed",
        Annulled => "Annulled",
    }
);

string_enum!(
    WillingToRelocate {
        Yes => "Yes",
        No => "No",
        Maybe => "Maybe",
    }
);


/// Declares a scored vocabulary that keeps unknown spellings verbatim in `Other`,
/// so two identical free-text answers still compare equal.
macro_rules! open_string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other(raw) => raw,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $($text => Self::$variant,)+
                    _ => Self::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_string_enum!(
    /// Smoking habit
    SmokingHabit {
        NonSmoker => "Non-smoker",
        Occasional => "Occasional",
        Regular => "Regular",
        TryingToQuit => "Trying to quit",
    }
);

open_string_enum!(
    /// Stance on having children
    ChildrenPreference {
        WantsChildren => "Wants children",
        DoesNotWantChildren => "Doesn't want children",
        OpenToChildren => "Open to children",
        HasChildren => "Has children",
    }
);

open_string_enum!(
    /// How soon someone intends to marry.
    ///
    /// The four known rungs form an ordered ladder; adjacency on the ladder earns partial
    /// credit when scoring. Anything else is kept verbatim in `Other`, which has no
    /// position on the ladder.
    MarriageTimeline {
        Asap => "ASAP",
        OneToTwoYears => "1-2 years",
        ThreePlusYears => "3+ years",
        NotSure => "Not sure",
    }
);

/// Deserialize an optional unscored vocabulary value, mapping unrecognised strings
/// to `None` so one bad attribute never rejects a whole profile.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::debug!("Ignoring unrecognised profile attribute value: {:?}", value);
            None
        }
    }))
}

impl MarriageTimeline {
    /// Ladder order, earliest first
    pub const LADDER: [MarriageTimeline; 4] = [
        MarriageTimeline::Asap,
        MarriageTimeline::OneToTwoYears,
        MarriageTimeline::ThreePlusYears,
        MarriageTimeline::NotSure,
    ];

    /// Position on the ladder, `None` for out-of-vocabulary values
    pub fn ordinal(&self) -> Option<usize> {
        Self::LADDER.iter().position(|rung| rung == self)
    }

    /// True when both values sit on neighbouring rungs
    pub fn is_adjacent_to(&self, other: &Self) -> bool {
        match (self.ordinal(), other.ordinal()) {
            (Some(a), Some(b)) => a.abs_diff(b) == 1,
            _ => false,
        }
    }
}

/// Subscription metadata recorded when premium is activated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub date: DateTime<Utc>,
    pub amount_usd: f64,
    pub period: String,
}

fn default_children_status() -> String {
    "No kids".to_string()
}

/// A registry member.
///
/// The same shape describes the signed-in member and every candidate. Scored attributes
/// that may be missing during onboarding are `Option`s: an absent value never matches,
/// while two present empty strings do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[validate(email)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 80))]
    #[serde(default)]
    pub name: String,
    #[validate(range(min = 18, max = 99))]
    #[serde(default)]
    pub age: u8,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub profile_image_urls: Vec<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,

    #[serde(default)]
    pub residence_country: Option<String>,
    #[serde(default)]
    pub residence_state: Option<String>,
    #[serde(default)]
    pub residence_city: Option<String>,
    #[serde(default)]
    pub origin_country: Option<String>,
    #[serde(default)]
    pub origin_state: Option<String>,
    #[serde(default)]
    pub origin_city: Option<String>,

    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub religion: Option<String>,
    #[serde(default)]
    pub cultural_background: Option<String>,
    #[serde(default)]
    pub personal_values: Vec<String>,
    #[serde(default)]
    pub smoking: Option<SmokingHabit>,
    #[serde(default, deserialize_with = "lenient")]
    pub drinking: Option<DrinkingHabit>,
    #[serde(default, deserialize_with = "lenient")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(default = "default_children_status")]
    pub children_status: String,
    #[serde(default)]
    pub marriage_timeline: Option<MarriageTimeline>,
    #[serde(default, deserialize_with = "lenient")]
    pub willing_to_relocate: Option<WillingToRelocate>,
    #[serde(default)]
    pub preferred_marry_from: String,
    #[serde(default)]
    pub children_preference: Option<ChildrenPreference>,
    #[serde(default)]
    pub ideal_partner_traits: Vec<String>,
    #[serde(default)]
    pub marriage_expectations: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub career_goals: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<Subscription>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: String::new(),
            email: None,
            name: String::new(),
            age: 0,
            bio: String::new(),
            interests: Vec::new(),
            profile_image_urls: Vec::new(),
            is_verified: false,
            is_premium: false,
            occupation: String::new(),
            city: String::new(),
            country: String::new(),
            residence_country: None,
            residence_state: None,
            residence_city: None,
            origin_country: None,
            origin_state: None,
            origin_city: None,
            education: String::new(),
            languages: Vec::new(),
            religion: None,
            cultural_background: None,
            personal_values: Vec::new(),
            smoking: None,
            drinking: None,
            marital_status: None,
            children_status: default_children_status(),
            marriage_timeline: None,
            willing_to_relocate: None,
            preferred_marry_from: String::new(),
            children_preference: None,
            ideal_partner_traits: Vec::new(),
            marriage_expectations: String::new(),
            nationality: String::new(),
            career_goals: String::new(),
            subscription: None,
        }
    }
}

impl Profile {
    pub fn builder(id: impl Into<String>, name: impl Into<String>, age: u8) -> ProfileBuilder {
        ProfileBuilder::new(id, name, age)
    }

    /// Build the stored profile that results from an onboarding or edit submission.
    ///
    /// Identity (id and email), verification, premium status and subscription stay
    /// with the existing record; everything else is taken from `submitted`.
    pub fn apply_edit(&self, submitted: Profile) -> Profile {
        Profile {
            id: self.id.clone(),
            email: self.email.clone(),
            is_verified: self.is_verified,
            is_premium: self.is_premium,
            subscription: self.subscription.clone(),
            ..submitted
        }
    }

    /// Copy of this profile with the verification flag set
    pub fn with_verified(&self, verified: bool) -> Profile {
        Profile {
            is_verified: verified,
            ..self.clone()
        }
    }

    /// Copy of this profile with premium activated
    pub fn with_subscription(&self, subscription: Subscription) -> Profile {
        Profile {
            is_premium: true,
            subscription: Some(subscription),
            ..self.clone()
        }
    }
}

/// Builder for [`Profile`] values
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    profile: Profile,
}

impl ProfileBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>, age: u8) -> Self {
        Self {
            profile: Profile {
                id: id.into(),
                name: name.into(),
                age,
                ..Profile::default()
            },
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.profile.email = Some(email.into());
        self
    }

    pub fn occupation(mut self, occupation: impl Into<String>) -> Self {
        self.profile.occupation = occupation.into();
        self
    }

    /// Display location used by the registry filter and search
    pub fn located(mut self, city: impl Into<String>, country: impl Into<String>) -> Self {
        self.profile.city = city.into();
        self.profile.country = country.into();
        self
    }

    pub fn residence(
        mut self,
        country: impl Into<String>,
        state: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        self.profile.residence_country = Some(country.into());
        self.profile.residence_state = Some(state.into());
        self.profile.residence_city = Some(city.into());
        self
    }

    pub fn origin(
        mut self,
        country: impl Into<String>,
        state: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        self.profile.origin_country = Some(country.into());
        self.profile.origin_state = Some(state.into());
        self.profile.origin_city = Some(city.into());
        self
    }

    pub fn marriage_timeline(mut self, timeline: impl Into<MarriageTimeline>) -> Self {
        self.profile.marriage_timeline = Some(timeline.into());
        self
    }

    pub fn personal_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profile.personal_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn religion(mut self, religion: impl Into<String>) -> Self {
        self.profile.religion = Some(religion.into());
        self
    }

    pub fn cultural_background(mut self, background: impl Into<String>) -> Self {
        self.profile.cultural_background = Some(background.into());
        self
    }

    pub fn children_preference(mut self, preference: ChildrenPreference) -> Self {
        self.profile.children_preference = Some(preference);
        self
    }

    pub fn smoking(mut self, habit: SmokingHabit) -> Self {
        self.profile.smoking = Some(habit);
        self
    }

    pub fn verified(mut self, verified: bool) -> Self {
        self.profile.is_verified = verified;
        self
    }

    pub fn premium(mut self, premium: bool) -> Self {
        self.profile.is_premium = premium;
        self
    }

    pub fn build(self) -> Profile {
        self.profile
    }
}

/// Registry filter criteria captured from the filter surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub min_age: u8,
    pub max_age: u8,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub verified_only: bool,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_age: 25,
            max_age: 35,
            location: String::new(),
            verified_only: false,
        }
    }
}

/// Headline reason behind a compatibility score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchReason {
    LocalProximity,
    CommonHeritage,
    AlignedMarriageGoals,
    SharedValues,
}

impl MatchReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::LocalProximity => "local proximity",
            Self::CommonHeritage => "common heritage",
            Self::AlignedMarriageGoals => "aligned marriage goals",
            Self::SharedValues => "shared registry values",
        }
    }
}

/// Score plus its human-readable explanation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compatibility {
    pub score: u8,
    pub top_reason: MatchReason,
    pub insight: String,
}

/// A candidate annotated with its compatibility against the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub profile: Profile,
    pub compatibility_score: u8,
    pub compatibility_insight: String,
}

/// Direct message between two members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub sender_id: String,
    pub recipient_id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender_id: impl Into<String>, recipient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Admin member listing tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminTab {
    #[default]
    All,
    Pending,
    Verified,
    Subscribers,
}

/// Registry-wide moderation counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub total: usize,
    pub pending: usize,
    pub verified: usize,
    pub subscribers: usize,
    pub total_revenue_usd: f64,
}
