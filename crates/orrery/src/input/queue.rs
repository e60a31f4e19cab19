use crate::input::command::Command;

/// Commands buffered between ticks.
/// The host pushes whenever the user acts; the runner drains the queue at
/// the start of the next tick so a command never lands mid-step.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    commands: Vec<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Take every pending command, oldest first.
    pub fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::BodyId;

    #[test]
    fn drain_preserves_order() {
        let mut q = CommandQueue::new();
        q.push(Command::SetSpeed(2.0));
        q.push(Command::Select(BodyId(3)));
        q.push(Command::TogglePause);
        assert_eq!(q.len(), 3);

        let commands = q.drain();
        assert_eq!(
            commands,
            vec![Command::SetSpeed(2.0), Command::Select(BodyId(3)), Command::TogglePause]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn iter_does_not_consume() {
        let mut q = CommandQueue::default();
        q.push(Command::CycleBelts);
        assert_eq!(q.iter().count(), 1);
        assert_eq!(q.len(), 1);
    }
}
