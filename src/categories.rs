//! Category management screen controller.
//!
//! A two-level editable tree (categories and their subcategories) with
//! three independent flows: creating a category (optionally seeded from a
//! CSV of subcategory titles and a thumbnail), batch-adding subcategories
//! with per-row thumbnails, and inline title renames.
//!
//! Reconciliation rule: every structural mutation trusts the backend's
//! returned object over any local reconstruction, so server-assigned
//! identities and ordering never drift. Inline renames are the one
//! local-first path; they are held `Dirty` until an explicit save and fall
//! back to the confirmed value when the save fails.

use futures::future::try_join_all;
use tracing::{info, warn};

use crate::editable::EditableText;
use crate::error::ConsoleError;
use crate::models::{Category, NewCategory, NewSubcategory, Subcategory};
use crate::service::{CategoryService, ConfirmPrompt, MutationOutcome};
use crate::uploads::{ImageFile, PreviewHandle, PreviewRegistry};

// ---------------------------------------------------------------------------
// Tree nodes
// ---------------------------------------------------------------------------

/// A subcategory in the local mirror, title held in editable form.
#[derive(Debug)]
pub struct SubcategoryNode {
    pub id: String,
    pub title: EditableText,
    pub thumbnail: Option<String>,
}

impl From<Subcategory> for SubcategoryNode {
    fn from(sub: Subcategory) -> Self {
        SubcategoryNode {
            id: sub.id,
            title: EditableText::new(sub.title),
            thumbnail: sub.thumbnail,
        }
    }
}

/// A category in the local mirror.
#[derive(Debug)]
pub struct CategoryNode {
    pub id: String,
    pub title: EditableText,
    pub thumbnail: Option<String>,
    pub sub_categories: Vec<SubcategoryNode>,
}

impl From<Category> for CategoryNode {
    fn from(cat: Category) -> Self {
        CategoryNode {
            id: cat.id,
            title: EditableText::new(cat.title),
            thumbnail: cat.thumbnail,
            sub_categories: cat.sub_categories.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// The new-category form: a title, a CSV of seed subcategory titles, and an
/// optional thumbnail with its live preview.
#[derive(Debug, Default)]
pub struct CategoryDraft {
    pub title: String,
    pub subcategory_csv: String,
    thumbnail: Option<(ImageFile, PreviewHandle)>,
}

impl CategoryDraft {
    pub fn preview_url(&self) -> Option<&str> {
        self.thumbnail.as_ref().map(|(_, handle)| handle.url())
    }

    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }
}

/// One row of the add-subcategories form. Never persisted as-is: valid rows
/// become `NewSubcategory` values at commit time.
#[derive(Debug, Default)]
pub struct PendingSubcategoryInput {
    pub title: String,
    thumbnail: Option<(ImageFile, PreviewHandle)>,
}

impl PendingSubcategoryInput {
    pub fn preview_url(&self) -> Option<&str> {
        self.thumbnail.as_ref().map(|(_, handle)| handle.url())
    }

    pub fn has_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Split a CSV of subcategory titles: commas separate, whitespace is
/// trimmed, empty tokens are dropped.
pub fn parse_subcategory_csv(csv: &str) -> Vec<NewSubcategory> {
    csv.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|title| NewSubcategory {
            title: title.to_string(),
            thumbnail: None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct CategoryTreeController<S, C> {
    service: S,
    confirm: C,
    categories: Vec<CategoryNode>,
    loading: bool,
    error: Option<String>,
    draft: CategoryDraft,
    selected_category_id: Option<String>,
    pending_inputs: Vec<PendingSubcategoryInput>,
    previews: PreviewRegistry,
}

impl<S: CategoryService, C: ConfirmPrompt> CategoryTreeController<S, C> {
    pub fn new(service: S, confirm: C) -> Self {
        CategoryTreeController {
            service,
            confirm,
            categories: Vec::new(),
            loading: false,
            error: None,
            draft: CategoryDraft::default(),
            selected_category_id: None,
            pending_inputs: vec![PendingSubcategoryInput::default()],
            previews: PreviewRegistry::new(),
        }
    }

    // -- Read accessors -----------------------------------------------------

    pub fn categories(&self) -> &[CategoryNode] {
        &self.categories
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn draft(&self) -> &CategoryDraft {
        &self.draft
    }

    pub fn selected_category_id(&self) -> Option<&str> {
        self.selected_category_id.as_deref()
    }

    pub fn pending_inputs(&self) -> &[PendingSubcategoryInput] {
        &self.pending_inputs
    }

    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    fn node_mut(&mut self, category_id: &str) -> Option<&mut CategoryNode> {
        self.categories.iter_mut().find(|c| c.id == category_id)
    }

    /// Swap one category in the mirror for the backend's updated object.
    fn reconcile_category(&mut self, updated: Category) {
        if let Some(node) = self.categories.iter_mut().find(|c| c.id == updated.id) {
            *node = updated.into();
        }
    }

    // -- Loading ------------------------------------------------------------

    /// Fetch the full tree, replacing the mirror wholesale on success. On
    /// failure whatever was previously loaded is preserved.
    pub async fn load_categories(&mut self) -> Result<(), ConsoleError> {
        self.loading = true;
        self.error = None;
        let result = self.service.list_categories().await;
        self.loading = false;
        match result {
            Ok(categories) => {
                info!(count = categories.len(), "loaded categories");
                self.categories = categories.into_iter().map(Into::into).collect();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load categories");
                self.error = Some("Failed to fetch categories.".to_string());
                Err(e)
            }
        }
    }

    // -- Category creation --------------------------------------------------

    pub fn set_draft_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_draft_csv(&mut self, csv: impl Into<String>) {
        self.draft.subcategory_csv = csv.into();
    }

    /// Attach a thumbnail to the draft, superseding (and releasing) any
    /// previous selection.
    pub fn set_draft_thumbnail(&mut self, file: ImageFile) {
        let handle = self.previews.acquire(&file);
        self.draft.thumbnail = Some((file, handle));
    }

    pub fn clear_draft_thumbnail(&mut self) {
        self.draft.thumbnail = None;
    }

    /// Create a category from the draft. If a thumbnail is attached it is
    /// uploaded first; the create request goes out only once the URL is
    /// known. On success the backend's category object is appended to the
    /// mirror and the draft resets. Failure at either step aborts without
    /// touching the mirror or the draft.
    pub async fn create_category(&mut self) -> Result<(), ConsoleError> {
        if self.draft.title.trim().is_empty() {
            let err = ConsoleError::validation("Category title cannot be empty.");
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.loading = true;
        self.error = None;

        let result = self.create_category_inner().await;
        self.loading = false;
        match result {
            Ok(created) => {
                info!(category_id = %created.id, "category created");
                self.categories.push(created.into());
                self.draft = CategoryDraft::default();
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to create category");
                self.error = Some("Failed to create category.".to_string());
                Err(e)
            }
        }
    }

    async fn create_category_inner(&self) -> Result<Category, ConsoleError> {
        let thumbnail = match &self.draft.thumbnail {
            Some((file, _)) => Some(self.service.upload_image(file).await?),
            None => None,
        };
        let body = NewCategory {
            title: self.draft.title.clone(),
            thumbnail,
            sub_categories: parse_subcategory_csv(&self.draft.subcategory_csv),
        };
        self.service.create_category(&body).await
    }

    // -- Category mutation --------------------------------------------------

    /// Delete a category and, implicitly, all its subcategories (the
    /// backend cascades; the console does not re-validate that).
    pub async fn delete_category(
        &mut self,
        category_id: &str,
    ) -> Result<MutationOutcome, ConsoleError> {
        if !self
            .confirm
            .confirm("Are you sure you want to delete this category?")
        {
            return Ok(MutationOutcome::Declined);
        }
        match self.service.delete_category(category_id).await {
            Ok(()) => {
                self.categories.retain(|c| c.id != category_id);
                if self.selected_category_id.as_deref() == Some(category_id) {
                    self.selected_category_id = None;
                }
                info!(category_id, "category deleted");
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!(category_id, error = %e, "category delete failed");
                self.error = Some("Failed to delete category.".to_string());
                Err(e)
            }
        }
    }

    /// Inline edit of a category title. Local only; `save_category_title`
    /// pushes it to the backend.
    pub fn rename_category(&mut self, category_id: &str, new_title: impl Into<String>) {
        if let Some(node) = self.node_mut(category_id) {
            node.title.edit(new_title);
        }
    }

    /// Save a dirty category title. No-op when the title is clean. A failed
    /// save reverts the local edit to the confirmed value.
    pub async fn save_category_title(&mut self, category_id: &str) -> Result<(), ConsoleError> {
        let Some(node) = self.categories.iter().find(|c| c.id == category_id) else {
            return Err(ConsoleError::validation(format!(
                "Unknown category: {category_id}"
            )));
        };
        if !node.title.is_dirty() {
            return Ok(());
        }
        let title = node.title.value().trim().to_string();
        if title.is_empty() {
            return Err(ConsoleError::validation("Category title cannot be empty."));
        }

        let result = self.service.update_category_title(category_id, &title).await;
        match result {
            Ok(()) => {
                if let Some(node) = self.node_mut(category_id) {
                    node.title.commit();
                }
                Ok(())
            }
            Err(e) => {
                if let Some(node) = self.node_mut(category_id) {
                    node.title.revert();
                }
                warn!(category_id, error = %e, "category title save failed");
                self.error = Some("Failed to update category title.".to_string());
                Err(e)
            }
        }
    }

    /// Inline edit of a subcategory title. Local only.
    pub fn rename_subcategory(
        &mut self,
        category_id: &str,
        subcategory_id: &str,
        new_title: impl Into<String>,
    ) {
        if let Some(node) = self.node_mut(category_id) {
            if let Some(sub) = node
                .sub_categories
                .iter_mut()
                .find(|s| s.id == subcategory_id)
            {
                sub.title.edit(new_title);
            }
        }
    }

    /// Save a dirty subcategory title. On success the backend returns the
    /// full updated category, which replaces the node wholesale; on failure
    /// the local edit reverts.
    pub async fn save_subcategory_title(
        &mut self,
        category_id: &str,
        subcategory_id: &str,
    ) -> Result<(), ConsoleError> {
        let Some(sub) = self
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .and_then(|c| c.sub_categories.iter().find(|s| s.id == subcategory_id))
        else {
            return Err(ConsoleError::validation(format!(
                "Unknown subcategory: {subcategory_id}"
            )));
        };
        if !sub.title.is_dirty() {
            return Ok(());
        }
        let title = sub.title.value().trim().to_string();
        if title.is_empty() {
            return Err(ConsoleError::validation(
                "Subcategory title cannot be empty.",
            ));
        }

        match self
            .service
            .update_subcategory_title(category_id, subcategory_id, &title)
            .await
        {
            Ok(updated) => {
                self.reconcile_category(updated);
                Ok(())
            }
            Err(e) => {
                if let Some(node) = self.node_mut(category_id) {
                    if let Some(sub) = node
                        .sub_categories
                        .iter_mut()
                        .find(|s| s.id == subcategory_id)
                    {
                        sub.title.revert();
                    }
                }
                warn!(category_id, subcategory_id, error = %e, "subcategory title save failed");
                self.error = Some("Failed to update subcategory title.".to_string());
                Err(e)
            }
        }
    }

    // -- Subcategory batch add ----------------------------------------------

    pub fn select_category(&mut self, category_id: Option<String>) {
        self.selected_category_id = category_id;
    }

    /// Append an empty input row. Local only.
    pub fn add_subcategory_input_row(&mut self) {
        self.pending_inputs.push(PendingSubcategoryInput::default());
    }

    /// Remove an input row (and release its preview). Local only.
    pub fn remove_subcategory_input_row(&mut self, index: usize) {
        if index < self.pending_inputs.len() {
            self.pending_inputs.remove(index);
        }
    }

    pub fn set_subcategory_input_title(&mut self, index: usize, title: impl Into<String>) {
        if let Some(row) = self.pending_inputs.get_mut(index) {
            row.title = title.into();
        }
    }

    /// Attach a thumbnail file to an input row, superseding any previous
    /// selection for that row. Nothing is uploaded yet.
    pub fn set_subcategory_thumbnail(&mut self, index: usize, file: ImageFile) {
        let handle = self.previews.acquire(&file);
        if let Some(row) = self.pending_inputs.get_mut(index) {
            row.thumbnail = Some((file, handle));
        }
    }

    /// Commit the pending input rows to the selected category. Rows with
    /// empty titles are silently dropped. All thumbnail uploads run
    /// concurrently and must all succeed before the single structural call
    /// goes out — any upload failure aborts the whole commit with the mirror
    /// and the input rows untouched. On success the backend's updated
    /// category replaces the affected node and the form resets to one empty
    /// row.
    pub async fn commit_subcategories(&mut self) -> Result<(), ConsoleError> {
        let Some(category_id) = self.selected_category_id.clone() else {
            let err = ConsoleError::validation("Select a category first.");
            self.error = Some(err.to_string());
            return Err(err);
        };
        let valid: Vec<(String, Option<ImageFile>)> = self
            .pending_inputs
            .iter()
            .filter(|row| row.is_valid())
            .map(|row| {
                (
                    row.title.trim().to_string(),
                    row.thumbnail.as_ref().map(|(file, _)| file.clone()),
                )
            })
            .collect();
        if valid.is_empty() {
            let err = ConsoleError::validation("Enter at least one valid subcategory.");
            self.error = Some(err.to_string());
            return Err(err);
        }

        self.loading = true;
        self.error = None;

        let result = self.commit_subcategories_inner(&category_id, valid).await;
        self.loading = false;
        match result {
            Ok(updated) => {
                info!(category_id = %category_id, "subcategories added");
                self.reconcile_category(updated);
                self.pending_inputs = vec![PendingSubcategoryInput::default()];
                Ok(())
            }
            Err(e) => {
                warn!(category_id = %category_id, error = %e, "subcategory commit failed");
                self.error = Some("Failed to upload subcategories.".to_string());
                Err(e)
            }
        }
    }

    async fn commit_subcategories_inner(
        &self,
        category_id: &str,
        rows: Vec<(String, Option<ImageFile>)>,
    ) -> Result<Category, ConsoleError> {
        let service = &self.service;
        let uploads = rows.into_iter().map(|(title, file)| async move {
            let thumbnail = match file {
                Some(file) => Some(service.upload_image(&file).await?),
                None => None,
            };
            Ok::<_, ConsoleError>(NewSubcategory { title, thumbnail })
        });
        // All uploads resolve before the structural call; input order is
        // preserved in the request body.
        let resolved = try_join_all(uploads).await?;
        service.add_subcategories(category_id, &resolved).await
    }

    /// Delete one subcategory; the backend returns the updated parent
    /// category, which replaces the node.
    pub async fn delete_subcategory(
        &mut self,
        category_id: &str,
        subcategory_id: &str,
    ) -> Result<MutationOutcome, ConsoleError> {
        if !self.confirm.confirm("Delete this subcategory?") {
            return Ok(MutationOutcome::Declined);
        }
        match self
            .service
            .delete_subcategory(category_id, subcategory_id)
            .await
        {
            Ok(updated) => {
                info!(category_id, subcategory_id, "subcategory deleted");
                self.reconcile_category(updated);
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!(category_id, subcategory_id, error = %e, "subcategory delete failed");
                self.error = Some("Failed to delete subcategory.".to_string());
                Err(e)
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::AutoConfirm;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockCatalog {
        categories: Vec<Category>,
        fail_list: bool,
        fail_create: bool,
        fail_update_title: bool,
        fail_delete: bool,
        create_calls: Arc<Mutex<Vec<NewCategory>>>,
        add_calls: Arc<Mutex<Vec<(String, Vec<NewSubcategory>)>>>,
        upload_calls: Arc<Mutex<Vec<String>>>,
        title_calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl CategoryService for MockCatalog {
        async fn list_categories(&self) -> Result<Vec<Category>, ConsoleError> {
            if self.fail_list {
                return Err(ConsoleError::remote("Connection to backend timed out"));
            }
            Ok(self.categories.clone())
        }

        async fn create_category(&self, category: &NewCategory) -> Result<Category, ConsoleError> {
            self.create_calls.lock().unwrap().push(category.clone());
            if self.fail_create {
                return Err(ConsoleError::remote("Backend server error (HTTP 500)"));
            }
            // The backend assigns identities and echoes the rest back.
            Ok(Category {
                id: "srv-new".to_string(),
                title: category.title.clone(),
                thumbnail: category.thumbnail.clone(),
                sub_categories: category
                    .sub_categories
                    .iter()
                    .enumerate()
                    .map(|(i, sub)| Subcategory {
                        id: format!("srv-sub-{i}"),
                        title: sub.title.clone(),
                        thumbnail: sub.thumbnail.clone(),
                    })
                    .collect(),
            })
        }

        async fn update_category_title(
            &self,
            category_id: &str,
            title: &str,
        ) -> Result<(), ConsoleError> {
            self.title_calls
                .lock()
                .unwrap()
                .push((category_id.to_string(), title.to_string()));
            if self.fail_update_title {
                Err(ConsoleError::remote("Backend server error (HTTP 500)"))
            } else {
                Ok(())
            }
        }

        async fn delete_category(&self, _category_id: &str) -> Result<(), ConsoleError> {
            if self.fail_delete {
                Err(ConsoleError::remote("Backend server error (HTTP 500)"))
            } else {
                Ok(())
            }
        }

        async fn add_subcategories(
            &self,
            category_id: &str,
            subcategories: &[NewSubcategory],
        ) -> Result<Category, ConsoleError> {
            self.add_calls
                .lock()
                .unwrap()
                .push((category_id.to_string(), subcategories.to_vec()));
            let mut base = self
                .categories
                .iter()
                .find(|c| c.id == category_id)
                .cloned()
                .expect("add_subcategories against unknown category");
            for (i, sub) in subcategories.iter().enumerate() {
                base.sub_categories.push(Subcategory {
                    id: format!("srv-sub-{i}"),
                    title: sub.title.clone(),
                    thumbnail: sub.thumbnail.clone(),
                });
            }
            Ok(base)
        }

        async fn update_subcategory_title(
            &self,
            category_id: &str,
            subcategory_id: &str,
            title: &str,
        ) -> Result<Category, ConsoleError> {
            if self.fail_update_title {
                return Err(ConsoleError::remote("Backend server error (HTTP 500)"));
            }
            let mut base = self
                .categories
                .iter()
                .find(|c| c.id == category_id)
                .cloned()
                .expect("update against unknown category");
            for sub in &mut base.sub_categories {
                if sub.id == subcategory_id {
                    sub.title = title.to_string();
                }
            }
            Ok(base)
        }

        async fn delete_subcategory(
            &self,
            category_id: &str,
            subcategory_id: &str,
        ) -> Result<Category, ConsoleError> {
            if self.fail_delete {
                return Err(ConsoleError::remote("Backend server error (HTTP 500)"));
            }
            let mut base = self
                .categories
                .iter()
                .find(|c| c.id == category_id)
                .cloned()
                .expect("delete against unknown category");
            base.sub_categories.retain(|s| s.id != subcategory_id);
            Ok(base)
        }

        async fn upload_image(&self, file: &ImageFile) -> Result<String, ConsoleError> {
            self.upload_calls.lock().unwrap().push(file.file_name.clone());
            if file.file_name == "bad.png" {
                Err(ConsoleError::remote("Backend server error (HTTP 500)"))
            } else {
                Ok(format!("https://cdn.example/{}", file.file_name))
            }
        }
    }

    struct Decline;

    impl ConfirmPrompt for Decline {
        fn confirm(&self, _message: &str) -> bool {
            false
        }
    }

    fn category(id: &str, title: &str, subs: &[(&str, &str)]) -> Category {
        Category {
            id: id.to_string(),
            title: title.to_string(),
            thumbnail: None,
            sub_categories: subs
                .iter()
                .map(|(sid, stitle)| Subcategory {
                    id: sid.to_string(),
                    title: stitle.to_string(),
                    thumbnail: None,
                })
                .collect(),
        }
    }

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", vec![1, 2, 3])
    }

    fn controller(
        categories: Vec<Category>,
    ) -> CategoryTreeController<MockCatalog, AutoConfirm> {
        let mock = MockCatalog {
            categories,
            ..MockCatalog::default()
        };
        CategoryTreeController::new(mock, AutoConfirm)
    }

    #[test]
    fn test_csv_parsing_trims_and_drops_empty_tokens() {
        let subs = parse_subcategory_csv(" Men ,, Women ,");
        let titles: Vec<&str> = subs.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Men", "Women"]);

        assert!(parse_subcategory_csv("").is_empty());
        assert!(parse_subcategory_csv(" , ,, ").is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_keeps_previous_mirror() {
        let mut ctl = controller(vec![category("c1", "Shoes", &[])]);
        ctl.load_categories().await.unwrap();
        assert_eq!(ctl.categories().len(), 1);

        ctl.service.fail_list = true;
        assert!(ctl.load_categories().await.is_err());
        assert_eq!(ctl.categories().len(), 1, "prior mirror must survive");
        assert!(ctl.error().is_some());
        assert!(!ctl.loading());
    }

    #[tokio::test]
    async fn test_create_category_from_csv_draft() {
        let mut ctl = controller(vec![category("c1", "Bags", &[])]);
        let create_calls = Arc::clone(&ctl.service.create_calls);
        ctl.load_categories().await.unwrap();

        ctl.set_draft_title("Shoes");
        ctl.set_draft_csv("Men, Women");
        ctl.create_category().await.unwrap();

        let calls = create_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].title, "Shoes");
        assert!(calls[0].thumbnail.is_none());
        let titles: Vec<&str> = calls[0].sub_categories.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Men", "Women"]);

        // Mirror grew by exactly one, equal to the server's object.
        assert_eq!(ctl.categories().len(), 2);
        let added = &ctl.categories()[1];
        assert_eq!(added.id, "srv-new");
        assert_eq!(added.title.value(), "Shoes");
        assert_eq!(added.sub_categories.len(), 2);

        // Draft reset.
        assert!(ctl.draft().title.is_empty());
        assert!(ctl.draft().subcategory_csv.is_empty());
    }

    #[tokio::test]
    async fn test_create_category_uploads_thumbnail_first() {
        let mut ctl = controller(vec![]);
        let create_calls = Arc::clone(&ctl.service.create_calls);
        let upload_calls = Arc::clone(&ctl.service.upload_calls);

        ctl.set_draft_title("Shoes");
        ctl.set_draft_thumbnail(png("shoes.png"));
        assert_eq!(ctl.previews().live_count(), 1);

        ctl.create_category().await.unwrap();

        assert_eq!(upload_calls.lock().unwrap().as_slice(), ["shoes.png"]);
        assert_eq!(
            create_calls.lock().unwrap()[0].thumbnail.as_deref(),
            Some("https://cdn.example/shoes.png")
        );
        // Draft reset drops the preview handle.
        assert_eq!(ctl.previews().live_count(), 0);
    }

    #[tokio::test]
    async fn test_create_category_upload_failure_aborts_without_create_call() {
        let mut ctl = controller(vec![]);
        let create_calls = Arc::clone(&ctl.service.create_calls);

        ctl.set_draft_title("Shoes");
        ctl.set_draft_csv("Men");
        ctl.set_draft_thumbnail(png("bad.png"));

        assert!(ctl.create_category().await.is_err());
        assert!(create_calls.lock().unwrap().is_empty());
        assert!(ctl.categories().is_empty());
        // Draft survives intact for a retry.
        assert_eq!(ctl.draft().title, "Shoes");
        assert!(ctl.draft().has_thumbnail());
        assert!(ctl.error().is_some());
    }

    #[tokio::test]
    async fn test_create_category_empty_title_is_rejected_locally() {
        let mut ctl = controller(vec![]);
        let create_calls = Arc::clone(&ctl.service.create_calls);

        ctl.set_draft_title("   ");
        let err = ctl.create_category().await.unwrap_err();
        assert!(err.is_validation());
        assert!(create_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_aborts_entirely_when_one_upload_fails() {
        let mut ctl = controller(vec![category("c1", "Shoes", &[("s1", "Men")])]);
        let add_calls = Arc::clone(&ctl.service.add_calls);
        ctl.load_categories().await.unwrap();
        ctl.select_category(Some("c1".to_string()));

        ctl.set_subcategory_input_title(0, "Women");
        ctl.set_subcategory_thumbnail(0, png("bad.png"));
        ctl.add_subcategory_input_row();
        ctl.set_subcategory_input_title(1, "Kids");
        ctl.set_subcategory_thumbnail(1, png("kids.png"));

        assert!(ctl.commit_subcategories().await.is_err());
        assert!(add_calls.lock().unwrap().is_empty(), "no structural call");
        assert_eq!(ctl.categories()[0].sub_categories.len(), 1);
        // Input rows survive for a retry.
        assert_eq!(ctl.pending_inputs().len(), 2);
        assert_eq!(ctl.pending_inputs()[0].title, "Women");
    }

    #[tokio::test]
    async fn test_commit_sends_one_call_with_rows_in_input_order() {
        let mut ctl = controller(vec![category("c1", "Shoes", &[])]);
        let add_calls = Arc::clone(&ctl.service.add_calls);
        ctl.load_categories().await.unwrap();
        ctl.select_category(Some("c1".to_string()));

        ctl.set_subcategory_input_title(0, " Women ");
        ctl.set_subcategory_thumbnail(0, png("women.png"));
        ctl.add_subcategory_input_row();
        ctl.set_subcategory_input_title(1, "Kids");
        assert_eq!(ctl.previews().live_count(), 1);

        ctl.commit_subcategories().await.unwrap();

        let calls = add_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (cat_id, subs) = &calls[0];
        assert_eq!(cat_id, "c1");
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].title, "Women");
        assert_eq!(
            subs[0].thumbnail.as_deref(),
            Some("https://cdn.example/women.png")
        );
        assert_eq!(subs[1].title, "Kids");
        assert!(subs[1].thumbnail.is_none());
        drop(calls);

        // Mirror reconciled from the server object; form reset.
        assert_eq!(ctl.categories()[0].sub_categories.len(), 2);
        assert_eq!(ctl.pending_inputs().len(), 1);
        assert!(ctl.pending_inputs()[0].title.is_empty());
        assert_eq!(ctl.previews().live_count(), 0, "previews released");
    }

    #[tokio::test]
    async fn test_commit_drops_empty_rows_silently() {
        let mut ctl = controller(vec![category("c1", "Shoes", &[])]);
        let add_calls = Arc::clone(&ctl.service.add_calls);
        ctl.load_categories().await.unwrap();
        ctl.select_category(Some("c1".to_string()));

        ctl.set_subcategory_input_title(0, "Women");
        ctl.add_subcategory_input_row();
        // Row 1 left empty — dropped, not an error.

        ctl.commit_subcategories().await.unwrap();
        assert_eq!(add_calls.lock().unwrap()[0].1.len(), 1);
    }

    #[tokio::test]
    async fn test_commit_preconditions() {
        let mut ctl = controller(vec![category("c1", "Shoes", &[])]);
        ctl.load_categories().await.unwrap();

        ctl.set_subcategory_input_title(0, "Women");
        let err = ctl.commit_subcategories().await.unwrap_err();
        assert!(err.is_validation(), "no category selected");

        ctl.select_category(Some("c1".to_string()));
        ctl.set_subcategory_input_title(0, "   ");
        let err = ctl.commit_subcategories().await.unwrap_err();
        assert!(err.is_validation(), "zero valid rows");
    }

    #[tokio::test]
    async fn test_rename_category_failed_save_reverts() {
        let mut ctl = controller(vec![category("c1", "Shoes", &[])]);
        ctl.service.fail_update_title = true;
        ctl.load_categories().await.unwrap();

        ctl.rename_category("c1", "Fotwear");
        assert_eq!(ctl.categories()[0].title.value(), "Fotwear");

        assert!(ctl.save_category_title("c1").await.is_err());
        assert_eq!(ctl.categories()[0].title.value(), "Shoes");
        assert!(!ctl.categories()[0].title.is_dirty());
        assert!(ctl.error().is_some());
    }

    #[tokio::test]
    async fn test_rename_category_successful_save_commits() {
        let mut ctl = controller(vec![category("c1", "Shoes", &[])]);
        let title_calls = Arc::clone(&ctl.service.title_calls);
        ctl.load_categories().await.unwrap();

        ctl.rename_category("c1", "Footwear");
        ctl.save_category_title("c1").await.unwrap();

        assert_eq!(
            title_calls.lock().unwrap().as_slice(),
            &[("c1".to_string(), "Footwear".to_string())]
        );
        assert_eq!(ctl.categories()[0].title.value(), "Footwear");
        assert!(!ctl.categories()[0].title.is_dirty());

        // Clean title saves again are no-ops.
        ctl.save_category_title("c1").await.unwrap();
        assert_eq!(title_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_subcategory_rename_reconciles_from_server() {
        let mut ctl = controller(vec![category("c1", "Shoes", &[("s1", "Men")])]);
        ctl.load_categories().await.unwrap();

        ctl.rename_subcategory("c1", "s1", "Men's");
        ctl.save_subcategory_title("c1", "s1").await.unwrap();

        let sub = &ctl.categories()[0].sub_categories[0];
        assert_eq!(sub.title.value(), "Men's");
        assert!(!sub.title.is_dirty());
    }

    #[tokio::test]
    async fn test_delete_category_declined_keeps_everything() {
        let mock = MockCatalog {
            categories: vec![category("c1", "Shoes", &[])],
            ..MockCatalog::default()
        };
        let mut ctl = CategoryTreeController::new(mock, Decline);
        ctl.load_categories().await.unwrap();

        assert_eq!(
            ctl.delete_category("c1").await.unwrap(),
            MutationOutcome::Declined
        );
        assert_eq!(ctl.categories().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_category_clears_selection() {
        let mut ctl = controller(vec![
            category("c1", "Shoes", &[]),
            category("c2", "Bags", &[]),
        ]);
        ctl.load_categories().await.unwrap();
        ctl.select_category(Some("c1".to_string()));

        ctl.delete_category("c1").await.unwrap();
        assert_eq!(ctl.categories().len(), 1);
        assert!(ctl.selected_category_id().is_none());
    }

    #[tokio::test]
    async fn test_delete_subcategory_replaces_node_with_server_object() {
        let mut ctl = controller(vec![category(
            "c1",
            "Shoes",
            &[("s1", "Men"), ("s2", "Women")],
        )]);
        ctl.load_categories().await.unwrap();

        ctl.delete_subcategory("c1", "s1").await.unwrap();
        let subs = &ctl.categories()[0].sub_categories;
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].id, "s2");
    }

    #[tokio::test]
    async fn test_removing_input_row_releases_its_preview() {
        let mut ctl = controller(vec![]);
        ctl.set_subcategory_thumbnail(0, png("a.png"));
        ctl.add_subcategory_input_row();
        ctl.set_subcategory_thumbnail(1, png("b.png"));
        assert_eq!(ctl.previews().live_count(), 2);

        ctl.remove_subcategory_input_row(0);
        assert_eq!(ctl.previews().live_count(), 1);
        assert_eq!(ctl.pending_inputs().len(), 1);

        // Superseding a row's file releases the old preview too.
        ctl.set_subcategory_thumbnail(0, png("c.png"));
        assert_eq!(ctl.previews().live_count(), 1);
    }
}
