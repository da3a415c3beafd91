mod census;
mod probe;
mod validation;
