pub mod ledger;

pub use ledger::insert_into_document;
