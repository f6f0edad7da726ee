//! Player-facing notifications.
//!
//! The core only produces, tags, and timestamps notifications. Display,
//! dismissal, and expiry sweeps belong to the UI; `expired` gives it the
//! one rule transient kinds share.

use serde::{Serialize, Deserialize};

use crate::fixed::{Fixed64, Year};
use crate::id::{ActionId, BuildingKey, LocationId, TechId};
use crate::science::Science;

/// One kind per variant of [`Notification`], for matching without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    ActionActivated,
    ActionCompleted,
    ConstructionStarted,
    ConstructionCompleted,
    ResearchProgress,
    ResearchCompleted,
    TechnologyUnlocked,
    ScienceStalled,
}

/// How long a notification stays relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Persistence {
    /// Shown until the player dismisses it.
    Persistent,
    /// Auto-expires one turn boundary after it was raised.
    Transient,
}

impl NotificationKind {
    pub fn persistence(self) -> Persistence {
        match self {
            NotificationKind::ActionCompleted
            | NotificationKind::ConstructionCompleted
            | NotificationKind::ResearchCompleted
            | NotificationKind::TechnologyUnlocked => Persistence::Persistent,
            NotificationKind::ActionActivated
            | NotificationKind::ConstructionStarted
            | NotificationKind::ResearchProgress
            | NotificationKind::ScienceStalled => Persistence::Transient,
        }
    }
}

/// An event the player should hear about, stamped with the year it
/// happened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    ActionActivated {
        action: ActionId,
        year: Year,
    },
    ActionCompleted {
        action: ActionId,
        location: Option<LocationId>,
        year: Year,
    },
    ConstructionStarted {
        building: BuildingKey,
        location: LocationId,
        year: Year,
    },
    ConstructionCompleted {
        building: BuildingKey,
        location: LocationId,
        year: Year,
    },
    ResearchProgress {
        tech: TechId,
        science: Science,
        consumed: Fixed64,
        year: Year,
    },
    ResearchCompleted {
        tech: TechId,
        year: Year,
    },
    TechnologyUnlocked {
        tech: TechId,
        year: Year,
    },
    ScienceStalled {
        year: Year,
    },
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::ActionActivated { .. } => NotificationKind::ActionActivated,
            Notification::ActionCompleted { .. } => NotificationKind::ActionCompleted,
            Notification::ConstructionStarted { .. } => NotificationKind::ConstructionStarted,
            Notification::ConstructionCompleted { .. } => NotificationKind::ConstructionCompleted,
            Notification::ResearchProgress { .. } => NotificationKind::ResearchProgress,
            Notification::ResearchCompleted { .. } => NotificationKind::ResearchCompleted,
            Notification::TechnologyUnlocked { .. } => NotificationKind::TechnologyUnlocked,
            Notification::ScienceStalled { .. } => NotificationKind::ScienceStalled,
        }
    }

    pub fn year(&self) -> Year {
        match *self {
            Notification::ActionActivated { year, .. }
            | Notification::ActionCompleted { year, .. }
            | Notification::ConstructionStarted { year, .. }
            | Notification::ConstructionCompleted { year, .. }
            | Notification::ResearchProgress { year, .. }
            | Notification::ResearchCompleted { year, .. }
            | Notification::TechnologyUnlocked { year, .. }
            | Notification::ScienceStalled { year } => year,
        }
    }

    /// Whether a transient notification has outlived its turn. Persistent
    /// kinds never expire on their own.
    pub fn expired(&self, current_year: Year) -> bool {
        match self.kind().persistence() {
            Persistence::Persistent => false,
            Persistence::Transient => self.year() + 1 < current_year,
        }
    }
}

/// Unbounded emit/drain queue; the UI drains it every frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, notification: Notification) {
        self.pending.push(notification);
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    /// Take everything emitted so far, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
