use crate::core::geo::{Point, Size};
use crate::{GuideError, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Everything shown to the user about one point of interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Landmark {
    pub name: String,
    /// Image file shown on the marker and in the detail popup.
    pub image: String,
    pub description: String,
    /// Destination handed to the directions app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tickets: Option<String>,
}

impl Landmark {
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            description: description.into(),
            address: None,
            website: None,
            tickets: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_website(mut self, url: impl Into<String>) -> Self {
        self.website = Some(url.into());
        self
    }

    pub fn with_tickets(mut self, url: impl Into<String>) -> Self {
        self.tickets = Some(url.into());
        self
    }

    // Empty strings count as absent

    pub fn address(&self) -> Option<&str> {
        non_empty(&self.address)
    }

    pub fn website(&self) -> Option<&str> {
        non_empty(&self.website)
    }

    pub fn tickets(&self) -> Option<&str> {
        non_empty(&self.tickets)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// A landmark pinned to a normalized (0..1, 0..1) spot on the map surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPlacement {
    pub landmark: Landmark,
    pub coords: Point,
}

impl MapPlacement {
    pub fn new(landmark: Landmark, coords: Point) -> Self {
        Self { landmark, coords }
    }

    /// Position on a surface of the given unscaled size.
    pub fn local_position(&self, surface: Size) -> Point {
        self.coords.scale_by(&surface)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkRegistry {
    placements: Vec<MapPlacement>,
}

static NEW_YORK: Lazy<LandmarkRegistry> = Lazy::new(|| {
    LandmarkRegistry::from_json_str(include_str!("new_york.json"))
        .expect("embedded New York landmark table is valid")
});

impl LandmarkRegistry {
    pub fn new(placements: Vec<MapPlacement>) -> Result<Self> {
        for placement in &placements {
            let Point { x, y } = placement.coords;
            if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
                return Err(GuideError::Config(format!(
                    "landmark {} has coordinates ({}, {}) outside the map",
                    placement.landmark.name, x, y
                )));
            }
        }
        Ok(Self { placements })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let placements: Vec<MapPlacement> = serde_json::from_str(json)?;
        Self::new(placements)
    }

    /// The landmarks of the New York guide.
    pub fn new_york() -> &'static LandmarkRegistry {
        &NEW_YORK
    }

    pub fn placements(&self) -> &[MapPlacement] {
        &self.placements
    }

    pub fn get(&self, index: usize) -> Option<&MapPlacement> {
        self.placements.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&MapPlacement> {
        self.placements.iter().find(|p| p.landmark.name == name)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_table() {
        let registry = LandmarkRegistry::new_york();
        assert_eq!(registry.len(), 24);

        let liberty = registry.find("Statue of Liberty").unwrap();
        assert_eq!(liberty.coords, Point::new(0.07, 0.05));
        assert_eq!(liberty.landmark.image, "statueOfLiberty.png");
        assert!(liberty.landmark.address().is_some());
        assert!(liberty.landmark.website().is_none());
    }

    #[test]
    fn test_placement_position() {
        let placement = MapPlacement::new(Landmark::new("A", "a.png", ""), Point::new(0.25, 0.5));
        assert_eq!(
            placement.local_position(Size::new(400.0, 200.0)),
            Point::new(100.0, 100.0)
        );
    }

    #[test]
    fn test_empty_links_are_absent() {
        let landmark = Landmark::new("A", "a.png", "").with_address("  ").with_tickets("https://t");
        assert!(landmark.address().is_none());
        assert_eq!(landmark.tickets(), Some("https://t"));
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let json = r#"[{ "landmark": { "name": "X", "image": "x.png", "description": "" },
                         "coords": { "x": 1.5, "y": 0.5 } }]"#;
        assert!(matches!(
            LandmarkRegistry::from_json_str(json),
            Err(GuideError::Config(_))
        ));
    }
}
