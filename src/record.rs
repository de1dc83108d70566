use serde::{Deserialize, Serialize};

/// One labelled email row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: String,
    pub email: String,
    pub phish: bool,
}

// Projections written to the training files. They borrow from the record
// and only live for the duration of a write.

#[derive(Debug, Serialize)]
pub struct EmailView<'a> {
    pub id: &'a str,
    pub email: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LabelView<'a> {
    pub id: &'a str,
    pub phish: bool,
}

#[derive(Debug, Serialize)]
pub struct FullView<'a> {
    pub id: &'a str,
    pub email: &'a str,
    pub phish: bool,
}

impl EmailRecord {
    pub fn new(id: impl Into<String>, email: impl Into<String>, phish: bool) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            phish,
        }
    }

    pub fn email_view(&self) -> EmailView<'_> {
        EmailView {
            id: &self.id,
            email: &self.email,
        }
    }

    pub fn label_view(&self) -> LabelView<'_> {
        LabelView {
            id: &self.id,
            phish: self.phish,
        }
    }

    pub fn full_view(&self) -> FullView<'_> {
        FullView {
            id: &self.id,
            email: &self.email,
            phish: self.phish,
        }
    }
}

pub fn email_views(records: &[EmailRecord]) -> Vec<EmailView<'_>> {
    records.iter().map(EmailRecord::email_view).collect()
}

pub fn label_views(records: &[EmailRecord]) -> Vec<LabelView<'_>> {
    records.iter().map(EmailRecord::label_view).collect()
}

pub fn full_views(records: &[EmailRecord]) -> Vec<FullView<'_>> {
    records.iter().map(EmailRecord::full_view).collect()
}
