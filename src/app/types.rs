// src/app/types.rs
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---- list kinds ----
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Movies,
    Tasks,
}

impl ItemKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Tasks => "tasks",
        }
    }

    /// Label for the "flag is true" status choice.
    pub const fn done_label(self) -> &'static str {
        match self {
            Self::Movies => "Watched",
            Self::Tasks => "Completed",
        }
    }

    /// Label for the "flag is false" status choice.
    pub const fn open_label(self) -> &'static str {
        match self {
            Self::Movies => "Unwatched",
            Self::Tasks => "Pending",
        }
    }

    pub const fn date_label(self) -> &'static str {
        match self {
            Self::Movies => "Watch date",
            Self::Tasks => "Due date",
        }
    }
}

// ---- tags ----
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagType {
    Park,
    Land,
    Attraction,
}

impl TagType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Park => "park",
            Self::Land => "land",
            Self::Attraction => "attraction",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "park" => Some(Self::Park),
            "land" => Some(Self::Land),
            "attraction" | "ride" => Some(Self::Attraction),
            _ => None,
        }
    }

    /// The tag type a parent of this type must have (`None` for roots).
    pub const fn parent_type(self) -> Option<Self> {
        match self {
            Self::Park => None,
            Self::Land => Some(Self::Park),
            Self::Attraction => Some(Self::Land),
        }
    }
}

/// A tag row as the store keeps it: one flat list with parent pointers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub tag_type: TagType,
    pub parent_id: Option<String>,
    pub icon: Option<String>,
    /// Attraction tracker flag; meaningless for parks and lands.
    pub done: bool,
}

/// Tag reference attached to an item (membership only).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagRef {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub parent_name: Option<String>,
}

impl TagRef {
    pub fn label(&self) -> String {
        let base = match &self.icon {
            Some(icon) if !icon.is_empty() => format!("{icon} {}", self.name),
            _ => self.name.clone(),
        };
        match &self.parent_name {
            Some(parent) => format!("{base} · {parent}"),
            None => base,
        }
    }
}

// ---- items ----
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub notes: Option<String>,
    pub watch_date: Option<String>,
    pub watched: bool,
    pub tags: Vec<TagRef>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub deep_link: Option<String>,
    pub justwatch_id: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub completed: bool,
    pub tags: Vec<TagRef>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoteColor {
    #[default]
    Yellow,
    Pink,
    Blue,
    Green,
}

impl NoteColor {
    pub const ALL: [Self; 4] = [Self::Yellow, Self::Pink, Self::Blue, Self::Green];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Blue => "blue",
            Self::Green => "green",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "yellow" => Some(Self::Yellow),
            "pink" => Some(Self::Pink),
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            _ => None,
        }
    }

    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Yellow => (250, 236, 160),
            Self::Pink => (248, 196, 214),
            Self::Blue => (190, 220, 250),
            Self::Green => (200, 236, 196),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Note {
    pub id: String,
    pub content: String,
    pub color: NoteColor,
    pub pinned: bool,
    pub created_at: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TripDetails {
    pub name: String,
    pub destination: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub lodging: String,
    pub notes: String,
}

// ---- creation payloads ----
#[derive(Clone, Debug, Default)]
pub struct NewMovie {
    pub title: String,
    pub notes: Option<String>,
    pub watch_date: Option<String>,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub deep_link: Option<String>,
    pub justwatch_id: Option<i64>,
}

#[derive(Clone, Debug, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct NewNote {
    pub content: String,
    pub color: NoteColor,
}

#[derive(Clone, Debug)]
pub struct NewTag {
    pub name: String,
    pub tag_type: TagType,
    pub parent_id: Option<String>,
    pub icon: Option<String>,
}

// ---- cross-thread messages ----
pub enum SearchMsg {
    Done {
        token: u64,
        results: Vec<crate::app::justwatch::NormalizedSearchResult>,
    },
}

pub struct PrefetchDone {
    pub url: String,
    pub result: Result<PathBuf, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterState {
    Pending, // queued or downloading
    Cached,  // file present on disk (ready to upload)
    Ready,   // texture uploaded
    Failed,  // permanent failure
}

// ---- UI controls ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Movies,
    Tasks,
    Notes,
    Parks,
    Trip,
    Agenda,
}

impl View {
    pub const ALL: [Self; 6] = [
        Self::Movies,
        Self::Tasks,
        Self::Notes,
        Self::Parks,
        Self::Trip,
        Self::Agenda,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Tasks => "tasks",
            Self::Notes => "notes",
            Self::Parks => "parks",
            Self::Trip => "trip",
            Self::Agenda => "agenda",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Movies => "Movies",
            Self::Tasks => "Tasks",
            Self::Notes => "Notes",
            Self::Parks => "Parks",
            Self::Trip => "Trip",
            Self::Agenda => "Agenda",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }
}
