/// worked batch reactor examples, selected by number
pub mod batch_examples;
