//! Branch visibility scope
//!
//! Administrators see every branch; everyone else is confined to the branch
//! they were assigned. Each read or mutation of branch-owned data checks the
//! caller's scope before touching the record.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identifiers::BranchId;

/// The set of branches a caller may operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchScope {
    /// Company-wide access
    Admin,
    /// Access restricted to a single branch
    Branch(BranchId),
}

impl BranchScope {
    /// Returns true when the scope covers `branch`.
    pub fn permits(&self, branch: BranchId) -> bool {
        match self {
            BranchScope::Admin => true,
            BranchScope::Branch(own) => *own == branch,
        }
    }

    /// Fails with a not-found error when the scope does not cover `branch`.
    ///
    /// Out-of-scope records are reported as missing rather than forbidden so
    /// callers cannot probe for other branches' data.
    pub fn check(&self, branch: BranchId, entity: &str) -> Result<(), CoreError> {
        if self.permits(branch) {
            Ok(())
        } else {
            Err(CoreError::not_found(format!("{entity} not found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_permits_any_branch() {
        assert!(BranchScope::Admin.permits(BranchId::new()));
    }

    #[test]
    fn test_branch_scope_is_exclusive() {
        let own = BranchId::new();
        let scope = BranchScope::Branch(own);
        assert!(scope.permits(own));
        assert!(!scope.permits(BranchId::new()));
    }

    #[test]
    fn test_check_reports_not_found() {
        let scope = BranchScope::Branch(BranchId::new());
        let err = scope.check(BranchId::new(), "sales invoice").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
