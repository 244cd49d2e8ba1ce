//! Project documents: files and folders.
//!
//! Files and folders share one listing endpoint, split by a
//! `filters[document_type]` parameter. Listings are large (10k per page)
//! and include soft-deleted rows, which are dropped client-side. Lookups
//! by name go list-then-show because the listing omits detail fields, and
//! [`Files::search`]/[`Folders::search`] offer a fuzzy variant for
//! partial names.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::client::{FilePart, FileUpdate, ProcoreClient, Scope};
use crate::error::{ProcoreError, Result};
use crate::fuzzy::partial_ratio;
use crate::resources::{FindResource, ListResource, ShowResource};

/// Fields to change on an existing file.
#[derive(Debug, Clone, Default)]
pub struct FileUpdateParams {
    /// New file name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Move the file under this folder.
    pub parent_id: Option<u64>,
    /// Permissions on the file.
    pub private: Option<bool>,
}

/// File access for one project, optionally rooted at a folder.
#[derive(Debug, Clone, Copy)]
pub struct Files {
    /// Company the project belongs to.
    pub company_id: u64,
    /// Project the files belong to.
    pub project_id: u64,
    /// Restrict listings to this parent folder; `None` lists everything.
    pub folder_id: Option<u64>,
}

/// Folder access for one project, optionally rooted at a folder.
#[derive(Debug, Clone, Copy)]
pub struct Folders {
    /// Company the project belongs to.
    pub company_id: u64,
    /// Project the folders belong to.
    pub project_id: u64,
    /// Restrict listings to this parent folder; `None` lists everything.
    pub folder_id: Option<u64>,
}

fn document_params(
    project_id: u64,
    folder_id: Option<u64>,
    doc_type: &str,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("view".to_string(), "normal".to_string()),
        ("sort".to_string(), "name".to_string()),
        ("filters[document_type]".to_string(), doc_type.to_string()),
        ("filters[is_in_recycle_bin]".to_string(), "false".to_string()),
        ("project_id".to_string(), project_id.to_string()),
    ];
    if let Some(folder_id) = folder_id {
        params.push(("filters[folder_id]".to_string(), folder_id.to_string()));
    }
    params
}

/// Fuzzy search shared by files and folders.
///
/// Scores every candidate's name, keeping the last-seen item at the
/// running maximum. Multiple perfect scores emit a warning but still
/// return one item; an all-zero scan is a lookup failure.
async fn search_documents<R>(
    resource: &R,
    client: &ProcoreClient,
    doc_type: &str,
    value: &str,
) -> Result<Value>
where
    R: ListResource,
{
    let docs = resource.list(client).await?;

    let mut best = 0u32;
    let mut perfect = 0u32;
    let mut result = None;

    for doc in docs {
        if doc.get("is_recycle_bin").and_then(Value::as_bool) == Some(true) {
            continue;
        }
        if doc.get("document_type").and_then(Value::as_str) != Some(doc_type) {
            continue;
        }
        let name = doc.get("name").and_then(Value::as_str).unwrap_or("");
        let score = partial_ratio(value, name);
        if score == 100 {
            perfect += 1;
        }
        if score >= best {
            best = score;
            result = Some(doc);
        }
    }

    if perfect > 1 {
        tracing::warn!(
            query = value,
            "multiple 100% matches, refine the search criteria for better results"
        );
    }

    match result {
        Some(mut doc) if best > 0 => {
            doc["search_criteria"] = json!({"value": value, "match": best});
            Ok(doc)
        }
        _ => Err(ProcoreError::NotFoundItem {
            entity: R::ENTITY,
            identifier: value.to_string(),
        }),
    }
}

#[async_trait]
impl ListResource for Files {
    const ENTITY: &'static str = "file";

    fn list_path(&self) -> String {
        format!("/rest/v1.0/projects/{}/documents", self.project_id)
    }

    fn scope(&self) -> Scope {
        Scope::company(self.company_id)
    }

    fn per_page(&self) -> u32 {
        10_000
    }

    fn extra_params(&self) -> Vec<(String, String)> {
        document_params(self.project_id, self.folder_id, "file")
    }

    fn filter_deleted(&self) -> bool {
        true
    }
}

#[async_trait]
impl ShowResource for Files {
    fn show_path(&self, id: u64) -> String {
        format!("/rest/v1.0/files/{id}")
    }

    fn show_params(&self) -> Vec<(String, String)> {
        vec![("project_id".to_string(), self.project_id.to_string())]
    }
}

#[async_trait]
impl FindResource for Files {
    fn detail_path(&self, id: u64) -> Option<String> {
        Some(self.show_path(id))
    }

    fn detail_params(&self) -> Vec<(String, String)> {
        self.show_params()
    }
}

impl Files {
    /// Upload a file, optionally into a parent folder.
    ///
    /// The file is read into memory for the duration of the call; no
    /// handle is left open on any exit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    pub async fn create(
        &self,
        client: &ProcoreClient,
        filepath: impl AsRef<std::path::Path> + Send,
        description: Option<&str>,
    ) -> Result<Value> {
        let part = FilePart::from_path("file[data]", filepath).await?;

        let mut fields = Map::new();
        fields.insert("file[name]".to_string(), json!(part.file_name.clone()));
        fields.insert(
            "file[description]".to_string(),
            json!(description.unwrap_or("None")),
        );
        if let Some(folder_id) = self.folder_id {
            fields.insert("file[parent_id]".to_string(), json!(folder_id));
        }

        client
            .post(
                "/rest/v1.0/files",
                self.scope(),
                &[("project_id".to_string(), self.project_id.to_string())],
                Some(&Value::Object(fields)),
                Some(&[part]),
            )
            .await
    }

    /// Update a file's metadata and optionally replace its content.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update(
        &self,
        client: &ProcoreClient,
        doc_id: u64,
        params: FileUpdateParams,
        upload: FileUpdate,
    ) -> Result<Value> {
        let mut fields = Map::new();
        if let Some(parent_id) = params.parent_id {
            fields.insert("file[parent_id]".to_string(), json!(parent_id));
        }
        if let Some(name) = params.name {
            fields.insert("file[name]".to_string(), json!(name));
        }
        if let Some(description) = params.description {
            fields.insert("file[description]".to_string(), json!(description));
        }
        if let Some(private) = params.private {
            fields.insert("file[private]".to_string(), json!(private));
        }

        client
            .patch(
                &format!("/rest/v1.0/files/{doc_id}"),
                self.scope(),
                &[("project_id".to_string(), self.project_id.to_string())],
                Some(&Value::Object(fields)),
                &upload,
            )
            .await
    }

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove(&self, client: &ProcoreClient, doc_id: u64) -> Result<()> {
        client
            .delete(
                &format!("/rest/v1.0/files/{doc_id}"),
                self.scope(),
                &[("project_id".to_string(), self.project_id.to_string())],
            )
            .await?;
        Ok(())
    }

    /// Find the file whose name is the closest partial match to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcoreError::NotFoundItem`] when nothing scores above
    /// zero.
    pub async fn search(&self, client: &ProcoreClient, value: &str) -> Result<Value> {
        search_documents(self, client, "file", value).await
    }
}

#[async_trait]
impl ListResource for Folders {
    const ENTITY: &'static str = "folder";

    fn list_path(&self) -> String {
        format!("/rest/v1.0/projects/{}/documents", self.project_id)
    }

    fn scope(&self) -> Scope {
        Scope::company(self.company_id)
    }

    fn per_page(&self) -> u32 {
        10_000
    }

    fn extra_params(&self) -> Vec<(String, String)> {
        document_params(self.project_id, self.folder_id, "folder")
    }

    fn filter_deleted(&self) -> bool {
        true
    }
}

#[async_trait]
impl ShowResource for Folders {
    fn show_path(&self, id: u64) -> String {
        format!("/rest/v1.0/folders/{id}")
    }

    fn show_params(&self) -> Vec<(String, String)> {
        vec![("project_id".to_string(), self.project_id.to_string())]
    }
}

#[async_trait]
impl FindResource for Folders {
    fn detail_path(&self, id: u64) -> Option<String> {
        Some(self.show_path(id))
    }

    fn detail_params(&self) -> Vec<(String, String)> {
        self.show_params()
    }
}

impl Folders {
    /// Create a folder, optionally under a parent folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create(&self, client: &ProcoreClient, name: &str) -> Result<Value> {
        let mut folder = Map::new();
        folder.insert("name".to_string(), json!(name));
        folder.insert("explicit_permissions".to_string(), json!(false));
        if let Some(parent_id) = self.folder_id {
            folder.insert("parent_id".to_string(), json!(parent_id.to_string()));
        }

        client
            .post(
                "/rest/v1.0/folders",
                self.scope(),
                &[("project_id".to_string(), self.project_id.to_string())],
                Some(&json!({ "folder": folder })),
                None,
            )
            .await
    }

    /// Update a folder's name, location, or permissions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update(
        &self,
        client: &ProcoreClient,
        doc_id: u64,
        name: Option<&str>,
        parent_id: Option<u64>,
        private: Option<bool>,
    ) -> Result<Value> {
        let mut folder = Map::new();
        if let Some(parent_id) = parent_id {
            folder.insert("parent_id".to_string(), json!(parent_id));
        }
        if let Some(name) = name {
            folder.insert("name".to_string(), json!(name));
        }
        if let Some(private) = private {
            folder.insert("explicit_permissions".to_string(), json!(private));
        }

        client
            .patch(
                &format!("/rest/v1.0/folders/{doc_id}"),
                self.scope(),
                &[("project_id".to_string(), self.project_id.to_string())],
                Some(&json!({ "folder": folder })),
                &FileUpdate::NoFiles,
            )
            .await
    }

    /// Delete a folder.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove(&self, client: &ProcoreClient, doc_id: u64) -> Result<()> {
        client
            .delete(
                &format!("/rest/v1.0/folders/{doc_id}"),
                self.scope(),
                &[("project_id".to_string(), self.project_id.to_string())],
            )
            .await?;
        Ok(())
    }

    /// Find the folder whose name is the closest partial match to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcoreError::NotFoundItem`] when nothing scores above
    /// zero.
    pub async fn search(&self, client: &ProcoreClient, value: &str) -> Result<Value> {
        search_documents(self, client, "folder", value).await
    }
}
