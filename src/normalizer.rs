use crate::types::{Participant, ParticipantType, StandingsRow};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows_total: usize,
    pub rejected_not_contestant: usize,
    pub rejected_team: usize,
    pub rejected_no_rating: usize,
    pub rejected_no_rank: usize,
    pub eligible: usize,
}

/// Participants ready for scoring plus the rating pool they are scored against.
/// `rating_pool[i]` is `participants[i].old_rating`.
#[derive(Debug, Default)]
pub struct NormalizedStandings {
    pub participants: Vec<Participant>,
    pub rating_pool: Vec<i32>,
    pub stats: NormalizeStats,
}

enum Rejection {
    NotContestant,
    Team,
    NoRating,
    NoRank,
}

/// Keep official, individual, previously-rated contestants in input order.
pub fn normalize(rows: &[StandingsRow]) -> NormalizedStandings {
    let mut out = NormalizedStandings::default();
    out.stats.rows_total = rows.len();

    for row in rows {
        match eligible_participant(row) {
            Ok(p) => {
                out.rating_pool.push(p.old_rating);
                out.participants.push(p);
            }
            Err(rejection) => match rejection {
                Rejection::NotContestant => out.stats.rejected_not_contestant += 1,
                Rejection::Team => out.stats.rejected_team += 1,
                Rejection::NoRating => out.stats.rejected_no_rating += 1,
                Rejection::NoRank => out.stats.rejected_no_rank += 1,
            },
        }
    }

    out.stats.eligible = out.participants.len();
    out
}

fn eligible_participant(row: &StandingsRow) -> Result<Participant, Rejection> {
    if row.party.participant_type != ParticipantType::Contestant {
        return Err(Rejection::NotContestant);
    }
    let [member] = row.party.members.as_slice() else {
        return Err(Rejection::Team);
    };
    let Some(old_rating) = row.old_rating else {
        return Err(Rejection::NoRating);
    };
    if row.rank == 0 {
        return Err(Rejection::NoRank);
    }

    Ok(Participant {
        handle: member.handle.clone(),
        rank: row.rank,
        old_rating,
        performance: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Member, Party};

    fn row(kind: ParticipantType, handles: &[&str], rank: u32, old_rating: Option<i32>) -> StandingsRow {
        StandingsRow {
            party: Party {
                participant_type: kind,
                members: handles
                    .iter()
                    .map(|h| Member { handle: h.to_string() })
                    .collect(),
            },
            rank,
            old_rating,
        }
    }

    #[test]
    fn drops_team_non_contestant_and_unrated_rows() {
        let rows = vec![
            row(ParticipantType::Contestant, &["alice"], 1, Some(1900)),
            row(ParticipantType::Contestant, &["bob", "carol"], 2, Some(1700)),
            row(ParticipantType::Practice, &["dave"], 3, Some(1600)),
            row(ParticipantType::Contestant, &["erin"], 4, None),
            row(ParticipantType::Contestant, &["frank"], 5, Some(1400)),
        ];

        let out = normalize(&rows);
        assert_eq!(out.participants.len(), 2);
        assert_eq!(out.rating_pool, vec![1900, 1400]);
        assert_eq!(out.participants[0].handle, "alice");
        assert_eq!(out.participants[1].handle, "frank");
        assert_eq!(out.participants[1].rank, 5);
        assert!(out.participants.iter().all(|p| p.performance.is_none()));

        assert_eq!(
            out.stats,
            NormalizeStats {
                rows_total: 5,
                rejected_not_contestant: 1,
                rejected_team: 1,
                rejected_no_rating: 1,
                rejected_no_rank: 0,
                eligible: 2,
            }
        );
    }

    #[test]
    fn virtual_and_out_of_competition_are_not_contestants() {
        let rows = vec![
            row(ParticipantType::Virtual, &["v"], 1, Some(1500)),
            row(ParticipantType::OutOfCompetition, &["o"], 1, Some(1500)),
            row(ParticipantType::Unknown, &["u"], 1, Some(1500)),
        ];
        let out = normalize(&rows);
        assert!(out.participants.is_empty());
        assert!(out.rating_pool.is_empty());
        assert_eq!(out.stats.rejected_not_contestant, 3);
    }

    #[test]
    fn memberless_party_is_rejected() {
        let out = normalize(&[row(ParticipantType::Contestant, &[], 1, Some(1500))]);
        assert!(out.participants.is_empty());
        assert_eq!(out.stats.rejected_team, 1);
    }

    #[test]
    fn rows_parsed_from_json_without_rank_or_rating_are_dropped() {
        let raw = r#"[
            {"party":{"participantType":"CONTESTANT","members":[{"handle":"a"}]},"rank":1,"oldRating":1500},
            {"party":{"participantType":"CONTESTANT","members":[{"handle":"b"}]},"rank":2},
            {"party":{"participantType":"CONTESTANT","members":[{"handle":"c"}]},"oldRating":1600},
            {"party":{"participantType":"CONTESTANT","members":[{"handle":"d"}]},"rank":3,"oldRating":null}
        ]"#;
        let rows: Vec<StandingsRow> = serde_json::from_str(raw).unwrap();
        let out = normalize(&rows);
        assert_eq!(out.participants.len(), 1);
        assert_eq!(out.rating_pool, vec![1500]);
        assert_eq!(out.stats.rejected_no_rating, 2);
        assert_eq!(out.stats.rejected_no_rank, 1);
    }

    #[test]
    fn malformed_row_is_dropped_not_fatal() {
        let raw = r#"{"rows":[
            {"party":{"participantType":"CONTESTANT","members":[{"handle":"a"}]},"rank":1,"oldRating":1500},
            {"party":{"participantType":"CONTESTANT","members":[{"handle":"b"}]},"rank":2,"oldRating":"abc"},
            {"party":{"participantType":"CONTESTANT","members":[{"handle":"c"}]},"rank":"3","oldRating":1400},
            {"party":{"participantType":"CONTESTANT","members":[{"handle":"d"}]},"rank":4,"oldRating":1300}
        ]}"#;
        let result: crate::types::StandingsResult = serde_json::from_str(raw).unwrap();
        let out = normalize(&result.rows);
        let handles: Vec<&str> = out.participants.iter().map(|p| p.handle.as_str()).collect();
        assert_eq!(handles, vec!["a", "d"]);
        assert_eq!(out.rating_pool, vec![1500, 1300]);
        assert_eq!(out.stats.rejected_no_rating, 1);
        assert_eq!(out.stats.rejected_no_rank, 1);
    }

    #[test]
    fn same_input_gives_same_pool() {
        let rows = vec![
            row(ParticipantType::Contestant, &["x"], 2, Some(1700)),
            row(ParticipantType::Contestant, &["y"], 1, Some(2100)),
            row(ParticipantType::Contestant, &["z"], 2, Some(1300)),
        ];
        let first = normalize(&rows);
        let second = normalize(&rows);
        assert_eq!(first.rating_pool, second.rating_pool);
        assert_eq!(first.participants, second.participants);
        // input order is kept even when ranks are not sorted
        assert_eq!(first.rating_pool, vec![1700, 2100, 1300]);
    }
}
