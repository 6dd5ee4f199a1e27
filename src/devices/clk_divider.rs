use crate::pins::{ClockDividerPort, Clocked, Resettable};

/// `clk_divider`: square wave with a period of `divisor` ticks, started and
/// stopped by single-tick strobes. The output is low for the first half of
/// each period.
#[derive(Debug, Clone)]
pub struct ClkDivider {
    pub i_reset_n: bool,
    pub i_start_stb: bool,
    pub i_reset_stb: bool,
    pub o_div_clk: bool,

    divisor: u32,
    counter: u32,
    running: bool,
}

impl ClkDivider {
    pub fn new(divisor: u32) -> Self {
        Self {
            i_reset_n: true,
            i_start_stb: false,
            i_reset_stb: false,
            o_div_clk: false,
            divisor: divisor.max(2),
            counter: 0,
            running: false,
        }
    }

    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Clocked for ClkDivider {
    fn advance_one_clock(&mut self) {
        if !self.i_reset_n || self.i_reset_stb {
            self.running = false;
            self.counter = 0;
            self.o_div_clk = false;
            return;
        }

        if self.i_start_stb {
            self.running = true;
            self.counter = 0;
            self.o_div_clk = false;
            return;
        }

        if self.running {
            self.counter = (self.counter + 1) % self.divisor;
            self.o_div_clk = self.counter >= self.divisor / 2;
        }
    }
}

impl Resettable for ClkDivider {
    fn set_reset_n(&mut self, level: bool) {
        self.i_reset_n = level;
    }
}

impl ClockDividerPort for ClkDivider {
    fn set_start_stb(&mut self, level: bool) {
        self.i_start_stb = level;
    }
    fn set_reset_stb(&mut self, level: bool) {
        self.i_reset_stb = level;
    }
    fn div_clk(&self) -> bool {
        self.o_div_clk
    }
}
