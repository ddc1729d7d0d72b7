//! Mood, Emotion, and Disposition Types
//!
//! Closed enum vocabularies for the affective state an agent carries into a
//! decision. Blends and intensity sets are fixed-size arrays keyed by enum
//! discriminant, so reading them during scoring allocates nothing.

use serde::{Deserialize, Serialize};

/// Broad mood an agent can be blended across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Content,
    Playful,
    Anxious,
    Irritable,
    Lonely,
    Drowsy,
}

impl Mood {
    /// All moods in canonical order.
    pub const ALL: [Mood; 6] = [
        Mood::Content,
        Mood::Playful,
        Mood::Anxious,
        Mood::Irritable,
        Mood::Lonely,
        Mood::Drowsy,
    ];

    /// Canonical array index for this mood.
    pub fn index(self) -> usize {
        match self {
            Mood::Content => 0,
            Mood::Playful => 1,
            Mood::Anxious => 2,
            Mood::Irritable => 3,
            Mood::Lonely => 4,
            Mood::Drowsy => 5,
        }
    }
}

/// Discrete intensity band for a mood weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBand {
    Faint,
    Steady,
    Strong,
}

impl IntensityBand {
    /// Quantizes a 0..1 weight into a band.
    pub fn from_weight(weight: f32) -> Self {
        if weight < 0.34 {
            IntensityBand::Faint
        } else if weight < 0.67 {
            IntensityBand::Steady
        } else {
            IntensityBand::Strong
        }
    }
}

/// Coarse summary of a mood blend: the dominant mood and its intensity band.
///
/// This is the granularity at which plan resolution distinguishes moods;
/// finer differences are deliberately invisible to the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoodLevel {
    pub mood: Mood,
    pub band: IntensityBand,
}

/// Weighted blend over all moods.
///
/// Weights are 0..1 and need not sum to 1; the dominant mood is the one with
/// the largest weight (ties resolve to the earlier mood in canonical order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoodBlend {
    weights: [f32; 6],
}

impl MoodBlend {
    /// Creates an empty blend (all weights zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a blend with a single mood at the given weight.
    pub fn single(mood: Mood, weight: f32) -> Self {
        let mut blend = Self::default();
        blend.set(mood, weight);
        blend
    }

    /// Returns the weight for a mood.
    pub fn weight(&self, mood: Mood) -> f32 {
        self.weights[mood.index()]
    }

    /// Sets the weight for a mood, clamped to 0..1.
    pub fn set(&mut self, mood: Mood, weight: f32) {
        self.weights[mood.index()] = weight.clamp(0.0, 1.0);
    }

    /// Iterates (mood, weight) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Mood, f32)> + '_ {
        Mood::ALL.iter().map(move |&m| (m, self.weights[m.index()]))
    }

    /// Returns the dominant mood. Ties resolve to canonical order, so the
    /// result is stable for identical blends.
    pub fn dominant(&self) -> Mood {
        let mut best = Mood::Content;
        let mut best_weight = f32::MIN;
        for (mood, weight) in self.iter() {
            if weight > best_weight {
                best = mood;
                best_weight = weight;
            }
        }
        best
    }

    /// Collapses the blend to its coarse level (dominant mood + band).
    pub fn coarse_level(&self) -> MoodLevel {
        let mood = self.dominant();
        MoodLevel {
            mood,
            band: IntensityBand::from_weight(self.weight(mood)),
        }
    }
}

/// Short-lived emotion an agent can carry at some intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Joy,
    Fear,
    Anger,
    Affection,
    Curiosity,
    Distress,
}

impl Emotion {
    /// All emotions in canonical order.
    pub const ALL: [Emotion; 6] = [
        Emotion::Joy,
        Emotion::Fear,
        Emotion::Anger,
        Emotion::Affection,
        Emotion::Curiosity,
        Emotion::Distress,
    ];

    /// Canonical array index for this emotion.
    pub fn index(self) -> usize {
        match self {
            Emotion::Joy => 0,
            Emotion::Fear => 1,
            Emotion::Anger => 2,
            Emotion::Affection => 3,
            Emotion::Curiosity => 4,
            Emotion::Distress => 5,
        }
    }
}

/// Active emotion intensities, 0..1 per emotion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionSet {
    intensities: [f32; 6],
}

impl EmotionSet {
    /// Creates an empty set (all intensities zero).
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the intensity for an emotion.
    pub fn intensity(&self, emotion: Emotion) -> f32 {
        self.intensities[emotion.index()]
    }

    /// Sets the intensity for an emotion, clamped to 0..1.
    pub fn set(&mut self, emotion: Emotion, intensity: f32) {
        self.intensities[emotion.index()] = intensity.clamp(0.0, 1.0);
    }

    /// Iterates (emotion, intensity) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        Emotion::ALL
            .iter()
            .map(move |&e| (e, self.intensities[e.index()]))
    }

    /// Deterministic hash of the set with intensities rounded to centi-units.
    ///
    /// FNV-1a over (index, rounded intensity) pairs. Seed-free, so the value
    /// is identical across processes and runs; intensity differences smaller
    /// than 0.01 hash identically.
    pub fn stable_hash(&self) -> u64 {
        const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
        const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

        let mut hash = FNV_OFFSET;
        for (emotion, intensity) in self.iter() {
            let rounded = (intensity * 100.0).round() as i64;
            hash ^= emotion.index() as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
            hash ^= rounded as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
        hash
    }
}

/// Life stage of an agent, used to bias goal desirability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgeCategory {
    Juvenile,
    #[default]
    Adult,
    Elder,
}

/// Category of activity a goal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalCategory {
    Social,
    Play,
    Rest,
    Forage,
    Explore,
    Work,
}

impl GoalCategory {
    /// All categories in canonical order.
    pub const ALL: [GoalCategory; 6] = [
        GoalCategory::Social,
        GoalCategory::Play,
        GoalCategory::Rest,
        GoalCategory::Forage,
        GoalCategory::Explore,
        GoalCategory::Work,
    ];

    /// Canonical array index for this category.
    pub fn index(self) -> usize {
        match self {
            GoalCategory::Social => 0,
            GoalCategory::Play => 1,
            GoalCategory::Rest => 2,
            GoalCategory::Forage => 3,
            GoalCategory::Explore => 4,
            GoalCategory::Work => 5,
        }
    }
}

/// Innate per-category desirability multipliers - fixed at creation.
///
/// A value of 1.0 is neutral; above favors the category, below disfavors it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatureBias {
    multipliers: [f32; 6],
}

impl Default for NatureBias {
    fn default() -> Self {
        Self {
            multipliers: [1.0; 6],
        }
    }
}

impl NatureBias {
    /// Creates a neutral nature (all multipliers 1.0).
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Returns the multiplier for a category.
    pub fn bias(&self, category: GoalCategory) -> f32 {
        self.multipliers[category.index()]
    }

    /// Sets the multiplier for a category, clamped to 0..2.
    pub fn set(&mut self, category: GoalCategory, multiplier: f32) {
        self.multipliers[category.index()] = multiplier.clamp(0.0, 2.0);
    }

    /// Builder form of [`NatureBias::set`].
    pub fn with(mut self, category: GoalCategory, multiplier: f32) -> Self {
        self.set(category, multiplier);
        self
    }
}
