use crate::push::NotificationControl;
use crate::sync::CategoryHandle;
use crate::types::events::Category;

use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub page_size: usize,
    pub categories: Arc<HashMap<Category, CategoryHandle>>,
    pub notifications: Arc<dyn NotificationControl>,
}
