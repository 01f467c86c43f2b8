pub mod books;

use folio_db::Database;
use folio_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
///
/// The first module registered is the one `/` redirects to.
pub fn register_all(registry: &mut ModuleRegistry, db: &Database) {
    registry.register(books::create_module(db.clone()));
}
