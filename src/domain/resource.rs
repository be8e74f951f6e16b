/// Outcome of an asynchronous fetch as seen by a screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Resource<T> {
    /// No data yet, or a refresh is underway
    #[default]
    Loading,
    Success {
        data: T,
        total_pages: Option<u32>,
    },
    Error {
        message: String,
        data: Option<T>,
    },
}

impl<T> Resource<T> {
    pub fn success(data: T) -> Self {
        Resource::Success {
            data,
            total_pages: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Resource::Error {
            message: message.into(),
            data: None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Loading => None,
            Resource::Success { data, .. } => Some(data),
            Resource::Error { data, .. } => data.as_ref(),
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            Resource::Loading => None,
            Resource::Success { data, .. } => Some(data),
            Resource::Error { data, .. } => data.as_mut(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Resource::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl<T> Resource<Vec<T>> {
    /// True when there is no data or the data is an empty list.
    pub fn is_empty(&self) -> bool {
        self.data().map_or(true, Vec::is_empty)
    }
}

/// Progress through a multi-page result set for one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationState {
    /// Zero-based page to request next / last requested
    pub page: u32,
    pub total_pages: Option<u32>,
    pub can_load_more: bool,
    pub is_loading_more: bool,
}

impl PaginationState {
    /// More pages exist strictly after `page`.
    pub fn has_more_after(total_pages: Option<u32>, page: u32) -> bool {
        total_pages.unwrap_or(0) > page.saturating_add(1)
    }
}
