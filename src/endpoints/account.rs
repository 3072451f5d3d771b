use serde_json::Value;

use super::{form_with_files, json_body};
use crate::client::{into_data, ApiClient, RequestOptions};
use crate::error::ApiError;
use crate::model::{
    ListQuery, ProfileUpdate, RentalRequest, RentalRequestInput, RentalRequestList,
    RentalRequestRecord, User, UserRecord,
};
use crate::transport::{FileUpload, FormData};

/// Identity documents are uploaded as a front/back pair under `images`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Aadhar,
    Pan,
}

impl DocumentKind {
    fn endpoint(self) -> &'static str {
        match self {
            DocumentKind::Aadhar => "/users/documents/aadhar",
            DocumentKind::Pan => "/users/documents/pan",
        }
    }
}

impl ApiClient {
    pub async fn get_profile(&self) -> Result<User, ApiError> {
        let record: UserRecord = self.get_data("/users/profile", RequestOptions::get()).await?;
        Ok(record.user)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let record: UserRecord = self
            .get_data("/users/profile", RequestOptions::put(json_body(update)?))
            .await?;
        self.session().store_user(&record.user);
        Ok(record.user)
    }

    pub async fn update_preferences(&self, preferences: Value) -> Result<User, ApiError> {
        let record: UserRecord = self
            .get_data("/users/preferences", RequestOptions::put(preferences))
            .await?;
        self.session().store_user(&record.user);
        Ok(record.user)
    }

    pub async fn upload_document(
        &self,
        kind: DocumentKind,
        front: FileUpload,
        back: FileUpload,
    ) -> Result<User, ApiError> {
        let form = FormData::new().files("images", [front, back]);
        let record: UserRecord = into_data(self.upload_file(kind.endpoint(), form).await?)?;
        Ok(record.user)
    }

    pub async fn upload_aadhar(&self, front: FileUpload, back: FileUpload) -> Result<User, ApiError> {
        self.upload_document(DocumentKind::Aadhar, front, back).await
    }

    pub async fn upload_pan(&self, front: FileUpload, back: FileUpload) -> Result<User, ApiError> {
        self.upload_document(DocumentKind::Pan, front, back).await
    }

    pub async fn upload_profile_image(&self, image: FileUpload) -> Result<User, ApiError> {
        let form = FormData::new().file("image", image);
        let record: UserRecord = into_data(self.upload_file("/users/profile-image", form).await?)?;
        self.session().store_user(&record.user);
        Ok(record.user)
    }

    /// Listings posted by the signed-in user, in any moderation state.
    pub async fn my_rental_requests(&self, query: &ListQuery) -> Result<RentalRequestList, ApiError> {
        self.get_data("/rental-requests/my", RequestOptions::get().query(query))
            .await
    }

    /// Post a new listing; it starts out pending moderation.
    pub async fn create_rental_request(
        &self,
        input: &RentalRequestInput,
        images: Vec<FileUpload>,
        video: Option<FileUpload>,
    ) -> Result<RentalRequest, ApiError> {
        let mut form = form_with_files(input, "images", images)?;
        if let Some(video) = video {
            form.push_file("video", video);
        }

        let record: RentalRequestRecord =
            into_data(self.upload_file("/rental-requests", form).await?)?;
        tracing::info!(listing_id = %record.rental_request.id, "rental request submitted");
        Ok(record.rental_request)
    }
}
