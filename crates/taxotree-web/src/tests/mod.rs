mod listing;
mod failures;
