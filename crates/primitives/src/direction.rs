/// Direction through an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqDirection {
	/// Towards higher indices.
	Next,
	/// Towards lower indices.
	Prev,
}
