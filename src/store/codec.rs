//! Record codec
//!
//! Converts the two storable entity types to and from their on-disk JSON
//! form. Only types implementing the sealed [`Record`] trait can pass through
//! here, so nothing outside the fixed schema ever reaches a bucket.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::bucket::Bucket;
use crate::error::{AgassiError, Result};
use crate::model::{Coach, Player, Score};

mod sealed {
    pub trait Sealed {}

    impl Sealed for crate::model::Player {}
    impl Sealed for crate::model::Coach {}
}

/// An entity stored under its own id in a dedicated bucket
pub trait Record: Serialize + DeserializeOwned + sealed::Sealed {
    /// Bucket holding records of this type
    const BUCKET: Bucket;

    /// Human-readable type name used in error messages
    const KIND: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Reject values JSON cannot carry losslessly (non-finite floats
    /// serialize as `null` and would not decode back)
    fn check_representable(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

impl Record for Player {
    const BUCKET: Bucket = Bucket::Players;
    const KIND: &'static str = "player";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn check_representable(&self) -> std::result::Result<(), String> {
        let review_scores = self
            .reviews
            .iter()
            .filter_map(|review| review.skills.as_ref())
            .flat_map(|skills| [&skills.total, &skills.forehand, &skills.backhand]);

        std::iter::once(&self.total_score)
            .chain(review_scores)
            .flatten()
            .try_for_each(check_score)
    }
}

impl Record for Coach {
    const BUCKET: Bucket = Bucket::Coaches;
    const KIND: &'static str = "coach";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

fn check_score(score: &Score) -> std::result::Result<(), String> {
    if score.score.is_finite() {
        Ok(())
    } else {
        Err(format!("score {} is not a finite number", score.score))
    }
}

/// Encode a record into its stored byte form
pub fn encode<R: Record>(record: &R) -> Result<Bytes> {
    record
        .check_representable()
        .map_err(|reason| AgassiError::Encode {
            kind: R::KIND,
            reason,
        })?;

    serde_json::to_vec(record)
        .map(Bytes::from)
        .map_err(|e| AgassiError::Encode {
            kind: R::KIND,
            reason: e.to_string(),
        })
}

/// Decode a record stored under `key` in `R::BUCKET`
pub fn decode<R: Record>(bytes: &[u8], key: &str) -> Result<R> {
    serde_json::from_slice(bytes).map_err(|e| AgassiError::Decode {
        bucket: R::BUCKET.name(),
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Review, Skills};

    fn reviewed_player() -> Player {
        Player {
            name: "Ana".to_string(),
            id: "p1".to_string(),
            reviews: vec![Review {
                author: Some(Coach::new("c1", "Bo")),
                skills: Some(Skills {
                    total: Some(Score::new(7.5, "solid")),
                    forehand: Some(Score::new(8.0, "heavy topspin")),
                    backhand: None,
                }),
            }],
            total_score: Some(Score::new(7.5, "")),
        }
    }

    #[test]
    fn test_player_round_trip() {
        let player = reviewed_player();
        let bytes = encode(&player).unwrap();
        let decoded: Player = decode(&bytes, "p1").unwrap();
        assert_eq!(decoded, player);
    }

    #[test]
    fn test_coach_round_trip() {
        let coach = Coach::new("c1", "Bo");
        let bytes = encode(&coach).unwrap();
        assert_eq!(decode::<Coach>(&bytes, "c1").unwrap(), coach);
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let bytes = encode(&Player::new("p1", "Ana")).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();
        assert_eq!(text, r#"{"name":"Ana","id":"p1"}"#);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let player = reviewed_player();
        assert_eq!(encode(&player).unwrap(), encode(&player).unwrap());
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let mut player = reviewed_player();
        player.reviews[0].skills.as_mut().unwrap().backhand = Some(Score::new(f32::NAN, ""));

        match encode(&player) {
            Err(AgassiError::Encode { kind, .. }) => assert_eq!(kind, "player"),
            other => panic!("Expected Encode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = encode(&reviewed_player()).unwrap();
        let truncated = &bytes[..bytes.len() / 2];

        match decode::<Player>(truncated, "p1") {
            Err(AgassiError::Decode { bucket, key, .. }) => {
                assert_eq!(bucket, "players");
                assert_eq!(key, "p1");
            }
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_wrong_shape() {
        assert!(matches!(
            decode::<Coach>(br#"{"name": 42, "id": "c1"}"#, "c1"),
            Err(AgassiError::Decode { .. })
        ));
        assert!(matches!(
            decode::<Player>(b"[1, 2, 3]", "p1"),
            Err(AgassiError::Decode { .. })
        ));
        assert!(matches!(
            decode::<Player>(b"", "p1"),
            Err(AgassiError::Decode { .. })
        ));
    }
}
