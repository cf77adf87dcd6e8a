use crate::world::position::Point2D;
use crate::world::regions::{Region, RegionKind, Zone};
use serde::{Deserialize, Serialize};

/// One reason a point may not hold a chest. Rules are data so that region
/// names and carve-outs can change with the world content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ExclusionRule {
    GuardedTown,
    RegionKind { kind: RegionKind },
    NamedRegion { name: String },
    /// x at or past this value belongs to the secondary coordinate space.
    BeyondX { x: i32 },
    Zone { name: String, area: Zone },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExclusionReason {
    GuardedTown,
    Region(RegionKind),
    NamedRegion,
    BeyondX,
    Zone,
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExclusionReason::GuardedTown => write!(f, "guarded town"),
            ExclusionReason::Region(kind) => write!(f, "{} region", kind.label()),
            ExclusionReason::NamedRegion => write!(f, "named region"),
            ExclusionReason::BeyondX => write!(f, "past x threshold"),
            ExclusionReason::Zone => write!(f, "exclusion zone"),
        }
    }
}

impl ExclusionRule {
    pub fn matches(&self, point: Point2D, region: Option<&Region>) -> bool {
        match self {
            ExclusionRule::GuardedTown => region.map(Region::is_guarded_town).unwrap_or(false),
            ExclusionRule::RegionKind { kind } => region.map(|r| r.kind == *kind).unwrap_or(false),
            ExclusionRule::NamedRegion { name } => region
                .map(|r| r.name.eq_ignore_ascii_case(name))
                .unwrap_or(false),
            ExclusionRule::BeyondX { x } => point.x >= *x,
            ExclusionRule::Zone { area, .. } => area.contains(point),
        }
    }

    pub fn reason(&self) -> ExclusionReason {
        match self {
            ExclusionRule::GuardedTown => ExclusionReason::GuardedTown,
            ExclusionRule::RegionKind { kind } => ExclusionReason::Region(*kind),
            ExclusionRule::NamedRegion { .. } => ExclusionReason::NamedRegion,
            ExclusionRule::BeyondX { .. } => ExclusionReason::BeyondX,
            ExclusionRule::Zone { .. } => ExclusionReason::Zone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionTable {
    pub rules: Vec<ExclusionRule>,
}

impl ExclusionTable {
    pub fn new(rules: Vec<ExclusionRule>) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Self {
        let named = ["Green Acres", "Star Room", "Wind", "Britain Graveyard", "Ocllo Island"];
        let mut rules = vec![
            ExclusionRule::GuardedTown,
            ExclusionRule::RegionKind {
                kind: RegionKind::Dungeon,
            },
            ExclusionRule::RegionKind {
                kind: RegionKind::House,
            },
            ExclusionRule::RegionKind {
                kind: RegionKind::Jail,
            },
        ];
        rules.extend(named.iter().map(|name| ExclusionRule::NamedRegion {
            name: (*name).to_string(),
        }));
        rules.push(ExclusionRule::BeyondX { x: 5120 });
        rules.push(ExclusionRule::Zone {
            name: "Hythloth approach".to_string(),
            area: Zone::new(4700, 3800, 4740, 3840),
        });
        Self { rules }
    }

    /// First rule that rejects the point, in table order.
    pub fn first_match(&self, point: Point2D, region: Option<&Region>) -> Option<&ExclusionRule> {
        self.rules.iter().find(|rule| rule.matches(point, region))
    }
}

impl Default for ExclusionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(name: &str, kind: RegionKind, guarded: bool) -> Region {
        Region {
            name: name.to_string(),
            kind,
            guarded,
            priority: 0,
            areas: vec![Zone::new(0, 0, 10, 10)],
        }
    }

    #[test]
    fn builtin_rejects_each_listed_case() {
        let table = ExclusionTable::builtin();
        let inside = Point2D::new(5, 5);
        let town = region("Britain", RegionKind::Town, true);
        let open_town = region("Buccaneer's Den", RegionKind::Town, false);
        let dungeon = region("Despise", RegionKind::Dungeon, false);
        let named = region("green acres", RegionKind::Other, false);

        assert_eq!(
            table.first_match(inside, Some(&town)).map(ExclusionRule::reason),
            Some(ExclusionReason::GuardedTown)
        );
        assert!(table.first_match(inside, Some(&open_town)).is_none());
        assert_eq!(
            table.first_match(inside, Some(&dungeon)).map(ExclusionRule::reason),
            Some(ExclusionReason::Region(RegionKind::Dungeon))
        );
        assert_eq!(
            table.first_match(inside, Some(&named)).map(ExclusionRule::reason),
            Some(ExclusionReason::NamedRegion)
        );
        assert_eq!(
            table.first_match(Point2D::new(5200, 100), None).map(ExclusionRule::reason),
            Some(ExclusionReason::BeyondX)
        );
        assert_eq!(
            table.first_match(Point2D::new(4720, 3820), None).map(ExclusionRule::reason),
            Some(ExclusionReason::Zone)
        );
        assert!(table.first_match(Point2D::new(1000, 1000), None).is_none());
    }

    #[test]
    fn table_loads_from_yaml() {
        let yaml = r#"
- rule: guarded_town
- rule: region_kind
  kind: jail
- rule: named_region
  name: Star Room
- rule: beyond_x
  x: 4000
- rule: zone
  name: pier
  area: { x1: 10, y1: 10, x2: 20, y2: 20 }
"#;
        let table: ExclusionTable = serde_yaml::from_str(yaml).expect("yaml");
        assert_eq!(table.rules.len(), 5);
        assert_eq!(
            table.rules[1],
            ExclusionRule::RegionKind {
                kind: RegionKind::Jail
            }
        );
        assert!(table.first_match(Point2D::new(15, 15), None).is_some());
        assert!(table.first_match(Point2D::new(3999, 15), None).is_none());
    }
}
