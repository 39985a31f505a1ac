use crate::api::{Acknowledgement, Material, NewSubject, Subject, SubjectUpdate};
use crate::client::{ApiClient, ApiPath, ClientResult, ProgressFn, UploadFile};

pub const SUBJECTS: &str = "/subjects";
pub const SUBJECT: &str = "/subjects/{id}";
pub const SUBJECT_MATERIALS: &str = "/subjects/{id}/materials";

/// Subject CRUD and material uploads.
pub struct SubjectsApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SubjectsApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// GET /subjects
    pub async fn get_all(&self) -> ClientResult<Vec<Subject>> {
        self.client.get(SUBJECTS).await
    }

    /// GET /subjects/{id}
    pub async fn get_by_id(&self, id: impl AsRef<str>) -> ClientResult<Subject> {
        self.client.get(ApiPath::expand(SUBJECT, &[id.as_ref()])).await
    }

    /// POST /subjects
    pub async fn create(&self, data: &NewSubject) -> ClientResult<Subject> {
        self.client.post(SUBJECTS, data).await
    }

    /// PUT /subjects/{id}
    pub async fn update(&self, id: impl AsRef<str>, data: &SubjectUpdate) -> ClientResult<Subject> {
        self.client.put(ApiPath::expand(SUBJECT, &[id.as_ref()]), data).await
    }

    /// DELETE /subjects/{id}
    pub async fn delete(&self, id: impl AsRef<str>) -> ClientResult<Option<Acknowledgement>> {
        self.client.delete(ApiPath::expand(SUBJECT, &[id.as_ref()])).await
    }

    /// POST /subjects/{id}/materials (multipart)
    pub async fn upload_material(
        &self,
        id: impl AsRef<str>,
        file: UploadFile,
        on_progress: Option<ProgressFn>,
    ) -> ClientResult<Material> {
        self.client
            .upload_file(ApiPath::expand(SUBJECT_MATERIALS, &[id.as_ref()]), file, on_progress)
            .await
    }
}
