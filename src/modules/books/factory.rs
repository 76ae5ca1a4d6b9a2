//! Random books for local development data.

use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::{Paragraph, Sentence, Word};
use fake::faker::name::en::Name;
use fake::Fake;

use super::models::BookPayload;

const EARLIEST_YEAR: i64 = 1970;

/// A payload that passes validation for `current_year`.
pub fn fake_book(current_year: i64) -> BookPayload {
    BookPayload {
        title: Sentence(3..7).fake(),
        description: Some(Paragraph(2..4).fake()),
        author: Name().fake(),
        genre: Word().fake(),
        publication_year: (EARLIEST_YEAR..=current_year).fake(),
        pages: Some((100..=1000).fake()),
        publisher: Some(CompanyName().fake()),
    }
}
