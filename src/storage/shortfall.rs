//! Shortfall tags: at most one per occurrence date or per week, per output.

use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use uuid::Uuid;

use crate::model::{ShortfallAnchor, ShortfallTag};
use crate::week::WeekWindow;

use super::{Result, Storage, parse_date, parse_uuid, placeholders};

impl Storage {
    /// Saves a tag, replacing the reason on any existing tag with the same
    /// output and anchor. Returns the stored tag, whose id is the existing
    /// one when a tag was replaced.
    pub fn save_shortfall_tag(&self, tag: &ShortfallTag) -> Result<ShortfallTag> {
        self.load_output(tag.output_id)?;
        let occurrence = tag.anchor.occurrence_date().map(|d| d.to_string());
        let week_start = tag.anchor.week_start().map(|d| d.to_string());

        let tx = self.conn.unchecked_transaction()?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM shortfall_tag
                 WHERE output_id = ?1 AND occurrence_date IS ?2 AND week_start IS ?3",
                params![tag.output_id.to_string(), &occurrence, &week_start],
                |row| row.get(0),
            )
            .optional()?;

        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE shortfall_tag SET reason = ?1, other_text = ?2 WHERE id = ?3",
                    params![tag.reason.as_str(), &tag.other_text, &id],
                )?;
                parse_uuid(&id, "shortfall tag id")?
            }
            None => {
                tx.execute(
                    "INSERT INTO shortfall_tag
                         (id, output_id, occurrence_date, week_start, reason, other_text)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        tag.id.to_string(),
                        tag.output_id.to_string(),
                        &occurrence,
                        &week_start,
                        tag.reason.as_str(),
                        &tag.other_text,
                    ],
                )?;
                tag.id
            }
        };
        tx.commit()?;

        tracing::debug!(%id, output = %tag.output_id, reason = %tag.reason, "shortfall tagged");
        Ok(ShortfallTag { id, ..tag.clone() })
    }

    /// Tags for the given outputs that belong to `week`: occurrence dates
    /// inside the window, or a week anchor equal to its start.
    pub fn load_shortfall_tags(&self, output_ids: &[Uuid], week: WeekWindow) -> Result<Vec<ShortfallTag>> {
        if output_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, output_id, occurrence_date, week_start, reason, other_text
             FROM shortfall_tag
             WHERE ((occurrence_date BETWEEN ?1 AND ?2) OR week_start = ?1)
               AND output_id IN ({})",
            placeholders(3, output_ids.len())
        );
        let args = [week.start.to_string(), week.end.to_string()]
            .into_iter()
            .chain(output_ids.iter().map(Uuid::to_string));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), read_row)?;
        let mut tags = Vec::new();
        for row in rows {
            tags.push(into_tag(row?)?);
        }
        Ok(tags)
    }
}

type TagRow = (String, String, Option<String>, Option<String>, String, Option<String>);

fn read_row(row: &Row<'_>) -> rusqlite::Result<TagRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_tag((id, output_id, occurrence, week_start, reason, other_text): TagRow) -> Result<ShortfallTag> {
    let occurrence = occurrence
        .map(|d| parse_date(&d, "shortfall occurrence_date"))
        .transpose()?;
    let week_start = week_start
        .map(|d| parse_date(&d, "shortfall week_start"))
        .transpose()?;

    Ok(ShortfallTag {
        id: parse_uuid(&id, "shortfall tag id")?,
        output_id: parse_uuid(&output_id, "shortfall output_id")?,
        anchor: ShortfallAnchor::from_parts(occurrence, week_start)?,
        reason: reason.parse()?,
        other_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::{FrequencyDraft, ShortfallReason};
    use crate::storage::test_support::{sample_outcome, sample_output, test_storage};
    use crate::week::WeekStart;

    fn week() -> WeekWindow {
        WeekWindow::containing(date(2026, 2, 23), WeekStart::Monday)
    }

    #[test]
    fn retagging_an_occurrence_replaces_the_reason() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let output = sample_output(&storage, &outcome, FrequencyDraft::daily());
        let anchor = ShortfallAnchor::Occurrence(date(2026, 2, 24));

        let first = ShortfallTag::new(output.id, anchor, ShortfallReason::Time, "").unwrap();
        let first = storage.save_shortfall_tag(&first).unwrap();

        let second = ShortfallTag::new(output.id, anchor, ShortfallReason::Other, "travel").unwrap();
        let saved = storage.save_shortfall_tag(&second).unwrap();
        assert_eq!(saved.id, first.id);

        let tags = storage.load_shortfall_tags(&[output.id], week()).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].reason, ShortfallReason::Other);
        assert_eq!(tags[0].other_text.as_deref(), Some("travel"));
    }

    #[test]
    fn week_and_occurrence_tags_coexist() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let output = sample_output(&storage, &outcome, FrequencyDraft::flexible_weekly(3));

        let day = ShortfallTag::new(
            output.id,
            ShortfallAnchor::Occurrence(date(2026, 2, 25)),
            ShortfallReason::Energy,
            "",
        )
        .unwrap();
        let wk = ShortfallTag::new(
            output.id,
            ShortfallAnchor::Week(date(2026, 2, 23)),
            ShortfallReason::Forgot,
            "",
        )
        .unwrap();
        storage.save_shortfall_tag(&day).unwrap();
        storage.save_shortfall_tag(&wk).unwrap();

        let tags = storage.load_shortfall_tags(&[output.id], week()).unwrap();
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn tags_outside_the_week_are_not_loaded() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let output = sample_output(&storage, &outcome, FrequencyDraft::daily());

        for anchor in [
            ShortfallAnchor::Occurrence(date(2026, 3, 2)),
            ShortfallAnchor::Week(date(2026, 2, 16)),
        ] {
            let tag = ShortfallTag::new(output.id, anchor, ShortfallReason::Time, "").unwrap();
            storage.save_shortfall_tag(&tag).unwrap();
        }

        assert!(storage.load_shortfall_tags(&[output.id], week()).unwrap().is_empty());
    }
}
