//! Paper entity

use crate::record::ExtractedRecord;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// UUID v7, time ordered
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub doi: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub author: String,

    #[sea_orm(column_type = "Text")]
    pub publication_title: String,

    #[sea_orm(column_type = "Text")]
    pub publication_date: String,

    #[sea_orm(column_type = "Text")]
    pub url: String,

    #[sea_orm(column_type = "Text")]
    pub keywords: String,

    #[sea_orm(column_name = "abstract", column_type = "Text")]
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    #[sea_orm(column_type = "Text")]
    pub publisher: String,

    #[sea_orm(column_type = "Text")]
    pub field_of_study: String,

    pub is_data_fusion_paper: bool,

    #[sea_orm(column_type = "Text")]
    pub data_fusion_classification_reason: String,

    pub created_at: DateTimeWithTimeZone,

    /// Always equal to `created_at`; papers are never edited after saving
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build a stored paper from a record plus store-assigned id and timestamp
    pub fn from_record(id: Uuid, created_at: DateTimeWithTimeZone, record: ExtractedRecord) -> Self {
        Self {
            id,
            doi: record.doi,
            title: record.title,
            author: record.author,
            publication_title: record.publication_title,
            publication_date: record.publication_date,
            url: record.url,
            keywords: record.keywords,
            abstract_text: record.abstract_text,
            publisher: record.publisher,
            field_of_study: record.field_of_study,
            is_data_fusion_paper: record.is_data_fusion_paper,
            data_fusion_classification_reason: record.data_fusion_classification_reason,
            created_at,
            updated_at: created_at,
        }
    }

    /// The twelve metadata fields without store bookkeeping
    pub fn record(&self) -> ExtractedRecord {
        ExtractedRecord {
            doi: self.doi.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            publication_title: self.publication_title.clone(),
            publication_date: self.publication_date.clone(),
            url: self.url.clone(),
            keywords: self.keywords.clone(),
            abstract_text: self.abstract_text.clone(),
            publisher: self.publisher.clone(),
            field_of_study: self.field_of_study.clone(),
            is_data_fusion_paper: self.is_data_fusion_paper,
            data_fusion_classification_reason: self.data_fusion_classification_reason.clone(),
        }
    }
}

