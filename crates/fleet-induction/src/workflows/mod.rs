pub mod induction;
pub mod roster;
