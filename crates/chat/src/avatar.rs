use std::path::{Path, PathBuf};

use crate::ids::ParticipantId;
use crate::model::Participant;

/// Number of participant badges shown before collapsing into an overflow badge.
pub const DEFAULT_AVATAR_GROUP_LIMIT: usize = 3;

/// Two-letter fallback shown when an avatar image is unavailable.
pub fn initials(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}

/// Resolves an avatar reference to a loadable local image.
///
/// Returns `None` for empty references and for anything that is not an existing file,
/// in which case the renderer falls back to [`initials`].
pub fn resolve_avatar(reference: &str) -> Option<PathBuf> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    let path = Path::new(reference);
    path.is_file().then(|| path.to_path_buf())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarBadge {
    pub id: ParticipantId,
    pub name: String,
    pub avatar: String,
    pub initials: String,
}

impl AvatarBadge {
    fn from_participant(participant: &Participant) -> Self {
        Self {
            id: participant.id,
            name: participant.name.clone(),
            avatar: participant.avatar.clone(),
            initials: initials(&participant.name),
        }
    }

    pub fn tooltip(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowBadge {
    pub count: usize,
}

impl OverflowBadge {
    pub fn label(&self) -> String {
        format!("+{}", self.count)
    }

    pub fn tooltip(&self) -> String {
        if self.count == 1 {
            "1 more member".to_string()
        } else {
            format!("{} more members", self.count)
        }
    }
}

/// Bounded preview of a participant list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarGroupLayout {
    pub visible: Vec<AvatarBadge>,
    pub overflow: Option<OverflowBadge>,
}

impl AvatarGroupLayout {
    pub fn compute(participants: &[Participant], limit: usize) -> Self {
        let visible = participants
            .iter()
            .take(limit)
            .map(AvatarBadge::from_participant)
            .collect::<Vec<_>>();
        let remaining = participants.len().saturating_sub(limit);
        let overflow = (remaining > 0).then_some(OverflowBadge { count: remaining });

        Self { visible, overflow }
    }

    /// Total badges drawn, overflow included.
    pub fn badge_count(&self) -> usize {
        self.visible.len() + usize::from(self.overflow.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participants(count: u64) -> Vec<Participant> {
        (0..count)
            .map(|index| {
                Participant::new(
                    ParticipantId::new(100 + index),
                    format!("member {index}"),
                    "/placeholder.svg",
                )
            })
            .collect()
    }

    #[test]
    fn badge_counts_follow_the_limit_for_every_size() {
        for total in 0..7u64 {
            for limit in 0..5usize {
                let list = participants(total);
                let layout = AvatarGroupLayout::compute(&list, limit);
                let total = total as usize;

                assert_eq!(layout.visible.len(), total.min(limit));
                assert_eq!(layout.overflow.is_some(), total > limit);
                if let Some(overflow) = layout.overflow {
                    assert_eq!(overflow.count, total - limit);
                }
            }
        }
    }

    #[test]
    fn visible_badges_keep_participant_order() {
        let list = participants(5);
        let layout = AvatarGroupLayout::compute(&list, DEFAULT_AVATAR_GROUP_LIMIT);

        let names = layout
            .visible
            .iter()
            .map(|badge| badge.tooltip())
            .collect::<Vec<_>>();
        assert_eq!(names, ["member 0", "member 1", "member 2"]);
        assert_eq!(layout.badge_count(), 4);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn overflow_tooltip_is_pluralized() {
        assert_eq!(OverflowBadge { count: 1 }.tooltip(), "1 more member");
        assert_eq!(OverflowBadge { count: 4 }.tooltip(), "4 more members");
        assert_eq!(OverflowBadge { count: 4 }.label(), "+4");
    }

    #[test]
    fn initials_use_the_first_two_characters() {
        assert_eq!(initials("Sarah Johnson"), "SA");
        assert_eq!(initials("é"), "É");
        assert_eq!(initials(""), "");
    }

    #[test]
    fn placeholder_references_fall_back_to_initials() {
        assert_eq!(resolve_avatar("/placeholder.svg?height=40&width=40"), None);
        assert_eq!(resolve_avatar("  "), None);
    }
}
