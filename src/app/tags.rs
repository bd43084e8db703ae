// src/app/tags.rs
//! Park → land → attraction forest rebuilt from the store's flat tag list.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::types::{Tag, TagRef, TagType};

/// One park and everything that hangs off it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagGroup {
    pub root_id: String,
    /// Park first, then its lands and attractions.
    pub members: Vec<TagRef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttractionNode {
    pub tag: Tag,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LandNode {
    pub tag: Tag,
    pub attractions: Vec<AttractionNode>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParkNode {
    pub tag: Tag,
    pub lands: Vec<LandNode>,
}

impl ParkNode {
    /// (done, total) attractions in this park.
    pub fn progress(&self) -> (usize, usize) {
        self.lands
            .iter()
            .flat_map(|l| l.attractions.iter())
            .fold((0, 0), |(done, total), a| {
                (done + usize::from(a.tag.done), total + 1)
            })
    }
}

/// Parks in input order; lands and attractions in input order under their parent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagForest {
    pub parks: Vec<ParkNode>,
    /// Lands and attractions dropped because their parent chain was broken.
    pub dropped: usize,
}

impl TagForest {
    /// Two passes: index every tag by id, then attach children to surviving parents.
    pub fn build(tags: &[Tag]) -> Self {
        let index: HashMap<&str, usize> = tags
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        let parent_of = |t: &Tag, want: TagType| -> Option<usize> {
            let pid = t.parent_id.as_deref()?;
            let &idx = index.get(pid)?;
            (tags[idx].tag_type == want).then_some(idx)
        };

        let mut park_slot: HashMap<usize, usize> = HashMap::new();
        let mut parks: Vec<ParkNode> = Vec::new();
        for (i, t) in tags.iter().enumerate() {
            if t.tag_type == TagType::Park {
                park_slot.insert(i, parks.len());
                parks.push(ParkNode {
                    tag: t.clone(),
                    lands: Vec::new(),
                });
            }
        }

        let mut dropped = 0usize;
        // land index in `tags` -> (park slot, land slot)
        let mut land_slot: HashMap<usize, (usize, usize)> = HashMap::new();
        for (i, t) in tags.iter().enumerate() {
            if t.tag_type != TagType::Land {
                continue;
            }
            match parent_of(t, TagType::Park).and_then(|p| park_slot.get(&p).copied()) {
                Some(ps) => {
                    land_slot.insert(i, (ps, parks[ps].lands.len()));
                    parks[ps].lands.push(LandNode {
                        tag: t.clone(),
                        attractions: Vec::new(),
                    });
                }
                None => {
                    debug!("dropping land {} with dangling parent", t.id);
                    dropped += 1;
                }
            }
        }

        for t in tags.iter().filter(|t| t.tag_type == TagType::Attraction) {
            match parent_of(t, TagType::Land).and_then(|l| land_slot.get(&l).copied()) {
                Some((ps, ls)) => parks[ps].lands[ls]
                    .attractions
                    .push(AttractionNode { tag: t.clone() }),
                None => {
                    debug!("dropping attraction {} with dangling parent", t.id);
                    dropped += 1;
                }
            }
        }

        Self { parks, dropped }
    }

    pub fn find_park(&self, park_id: &str) -> Option<&ParkNode> {
        self.parks.iter().find(|p| p.tag.id == park_id)
    }

    /// Flattened group view used by the tag selector.
    pub fn groups(&self) -> Vec<TagGroup> {
        self.parks
            .iter()
            .map(|park| {
                let mut members = vec![to_ref(&park.tag, None)];
                for land in &park.lands {
                    members.push(to_ref(&land.tag, Some(&park.tag.name)));
                    for attraction in &land.attractions {
                        members.push(to_ref(&attraction.tag, Some(&land.tag.name)));
                    }
                }
                TagGroup {
                    root_id: park.tag.id.clone(),
                    members,
                }
            })
            .collect()
    }
}

fn to_ref(tag: &Tag, parent_name: Option<&str>) -> TagRef {
    TagRef {
        id: tag.id.clone(),
        name: tag.name.clone(),
        icon: tag.icon.clone(),
        parent_name: parent_name.map(str::to_string),
    }
}

/// Group a flat tag list by park. Tags whose parent chain does not reach a
/// park in `tags` are dropped.
pub fn group_by_root(tags: &[Tag]) -> Vec<TagGroup> {
    TagForest::build(tags).groups()
}

pub fn find_group<'a>(groups: &'a [TagGroup], root_id: &str) -> Option<&'a TagGroup> {
    groups.iter().find(|g| g.root_id == root_id)
}

/// (done, total) attractions for one park; (0, 0) for an unknown park.
pub fn attraction_progress(forest: &TagForest, park_id: &str) -> (usize, usize) {
    forest.find_park(park_id).map_or((0, 0), ParkNode::progress)
}

/// Flat set of selected tag ids across all levels. Selecting a park does not
/// select its lands or attractions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSelection {
    ids: BTreeSet<String>,
}

impl TagSelection {
    pub fn from_refs(tags: &[TagRef]) -> Self {
        Self {
            ids: tags.iter().map(|t| t.id.clone()).collect(),
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: &str, tag_type: TagType, parent: Option<&str>) -> Tag {
        Tag {
            id: id.into(),
            name: format!("{id}-name"),
            tag_type,
            parent_id: parent.map(str::to_string),
            icon: None,
            done: false,
        }
    }

    fn sample() -> Vec<Tag> {
        vec![
            t("a1", TagType::Attraction, Some("l1")),
            t("p1", TagType::Park, None),
            t("l1", TagType::Land, Some("p1")),
            t("p2", TagType::Park, None),
            t("l2", TagType::Land, Some("p2")),
            t("a2", TagType::Attraction, Some("l2")),
            t("a3", TagType::Attraction, Some("l1")),
        ]
    }

    #[test]
    fn groups_put_root_first_with_parent_names() {
        let groups = group_by_root(&sample());
        assert_eq!(groups.len(), 2);

        let g1 = find_group(&groups, "p1").unwrap();
        let ids: Vec<&str> = g1.members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "l1", "a1", "a3"]);
        assert_eq!(g1.members[0].parent_name, None);
        assert_eq!(g1.members[1].parent_name.as_deref(), Some("p1-name"));
        assert_eq!(g1.members[2].parent_name.as_deref(), Some("l1-name"));

        let g2 = find_group(&groups, "p2").unwrap();
        assert_eq!(g2.members.len(), 3);
    }

    #[test]
    fn dangling_references_are_dropped() {
        let tags = vec![
            t("p1", TagType::Park, None),
            t("l1", TagType::Land, Some("p1")),
            t("l-orphan", TagType::Land, Some("missing")),
            t("a-orphan", TagType::Attraction, Some("l-orphan")),
            t("a-gone", TagType::Attraction, Some("nowhere")),
            t("a-on-park", TagType::Attraction, Some("p1")),
            t("a1", TagType::Attraction, Some("l1")),
        ];
        let forest = TagForest::build(&tags);
        assert_eq!(forest.dropped, 4);

        let groups = forest.groups();
        assert_eq!(groups.len(), 1);
        let ids: Vec<&str> = groups[0].members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "l1", "a1"]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_root(&[]).is_empty());
    }

    #[test]
    fn selection_does_not_cascade() {
        let mut sel = TagSelection::default();
        assert!(sel.toggle("p1"));
        assert!(sel.contains("p1"));
        assert!(!sel.contains("l1"));
        assert!(!sel.toggle("p1"));
        assert!(sel.is_empty());

        sel.toggle("a1");
        sel.toggle("l2");
        assert_eq!(sel.ids(), vec!["a1".to_string(), "l2".to_string()]);
        sel.clear();
        assert_eq!(sel.len(), 0);
    }

    #[test]
    fn progress_counts_done_attractions() {
        let mut tags = sample();
        for tag in tags.iter_mut() {
            if tag.id == "a3" {
                tag.done = true;
            }
        }
        let forest = TagForest::build(&tags);
        assert_eq!(attraction_progress(&forest, "p1"), (1, 2));
        assert_eq!(attraction_progress(&forest, "p2"), (0, 1));
        assert_eq!(attraction_progress(&forest, "nope"), (0, 0));
    }
}
