//! Primary emotion clusters used for grouping and layout.

/// One named cluster with the labels it absorbs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryCluster {
    pub key: &'static str,
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
    pub color_hex: &'static str,
    /// Layout position in scene units.
    pub centroid: [f32; 3],
    pub radius: f32,
}

impl PrimaryCluster {
    /// Whether `label` belongs to this cluster.
    pub fn contains(&self, label: &str) -> bool {
        self.key == label || self.synonyms.contains(&label)
    }
}

/// The eight primary clusters.
pub const PRIMARY_CLUSTERS: [PrimaryCluster; 8] = [
    PrimaryCluster {
        key: "love",
        name: "Love",
        synonyms: &["affection", "tenderness", "compassion", "adoration", "empathy", "gratitude"],
        color_hex: "#EC407A",
        centroid: [0.0, 6.0, 0.0],
        radius: 3.0,
    },
    PrimaryCluster {
        key: "joy",
        name: "Joy",
        synonyms: &["happiness", "delight", "pride", "excitement", "contentment", "amusement"],
        color_hex: "#FFD54F",
        centroid: [6.0, 4.0, 0.0],
        radius: 3.0,
    },
    PrimaryCluster {
        key: "calm",
        name: "Calm",
        synonyms: &["serenity", "peace", "relief", "relaxation"],
        color_hex: "#81D4FA",
        centroid: [8.0, -2.0, 0.0],
        radius: 2.5,
    },
    PrimaryCluster {
        key: "sadness",
        name: "Sadness",
        synonyms: &["grief", "sorrow", "loneliness", "melancholy", "guilt", "shame"],
        color_hex: "#5C6BC0",
        centroid: [0.0, -6.0, 0.0],
        radius: 3.0,
    },
    PrimaryCluster {
        key: "fear",
        name: "Fear",
        synonyms: &["anxiety", "worry", "nervousness", "dread", "panic"],
        color_hex: "#7E57C2",
        centroid: [-6.0, -4.0, 0.0],
        radius: 2.5,
    },
    PrimaryCluster {
        key: "anger",
        name: "Anger",
        synonyms: &["rage", "frustration", "irritation", "disgust", "resentment"],
        color_hex: "#E53935",
        centroid: [-8.0, 2.0, 0.0],
        radius: 2.5,
    },
    PrimaryCluster {
        key: "surprise",
        name: "Surprise",
        synonyms: &["amazement", "astonishment", "curiosity", "awe", "wonder"],
        color_hex: "#FF7043",
        centroid: [-4.0, 6.0, 2.0],
        radius: 2.0,
    },
    PrimaryCluster {
        key: "nostalgia",
        name: "Nostalgia",
        synonyms: &["longing", "wistfulness", "reminiscence", "yearning"],
        color_hex: "#A1887F",
        centroid: [4.0, -6.0, -2.0],
        radius: 2.0,
    },
];

/// The primary cluster a label belongs to (case-insensitive), if any.
pub fn primary_cluster_of(label: &str) -> Option<&'static PrimaryCluster> {
    let label = label.to_lowercase();
    PRIMARY_CLUSTERS.iter().find(|c| c.contains(&label))
}
