use crate::jellyfin_rs::MediaItem;

/// Pick the candidate from the other server that corresponds to `source`.
///
/// Rules are tried in order and the first one that matches anything wins:
/// 1. same id, ignoring case
/// 2. same name, exact
/// 3. same runtime, only when the source runtime is known (non-zero)
///
/// Within a rule the first candidate in search order is taken. This is a
/// heuristic: two different movies sharing a name will resolve to whichever
/// the server listed first.
pub fn find_matching_item<'a>(
    source: &MediaItem,
    candidates: &'a [MediaItem],
) -> Option<&'a MediaItem> {
    candidates
        .iter()
        .find(|candidate| candidate.id.eq_ignore_ascii_case(&source.id))
        .or_else(|| {
            candidates
                .iter()
                .find(|candidate| candidate.name == source.name)
        })
        .or_else(|| {
            // Zero runtime means unknown.
            if source.runtime_ticks == 0 {
                return None;
            }
            candidates
                .iter()
                .find(|candidate| candidate.runtime_ticks == source.runtime_ticks)
        })
}
