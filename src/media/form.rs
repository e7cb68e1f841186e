use std::collections::HashMap;

use axum::extract::Multipart;

use super::services::UploadedFile;
use crate::error::{AppError, AppResult};

/// A fully read multipart body: text fields plus any attached files.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    pub async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_string);
            let body = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("could not read field {name}: {e}")))?;

            match file_name {
                // an empty file input still arrives as a part with a blank filename
                Some(file_name) if file_name.is_empty() && body.is_empty() => {}
                Some(file_name) => {
                    form.files.insert(name, UploadedFile { file_name, body });
                }
                None => {
                    let text = String::from_utf8(body.to_vec())
                        .map_err(|_| AppError::validation(format!("field {name} is not utf-8")))?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Trimmed, non-blank text or a validation error naming the field.
    pub fn required_text(&self, name: &str) -> AppResult<String> {
        match self.text(name).map(str::trim) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(AppError::validation(format!("{name} is required"))),
        }
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}
