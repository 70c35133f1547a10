//! The neutralization engine.

use crate::error::CashoutError;
use crate::materialize::{back_index, lay_index, vector_to_orders};
use crate::types::{CashoutResult, Mode};
use crate::MAX_STD_CEILING;
use bet_hedge_core::{
    fill_missing_selections, pnl_outcomes, BookSnapshot, MatchedPositions, OpenPositions, Order,
    PnlOutcomes, Side,
};
use bet_hedge_solver::{ConeProblem, ConeSolver, NormConstraint, SolverError};
use ndarray::{Array1, Array2};
use tracing::{debug, info, warn};

// =============================================================================
// Engine
// =============================================================================

/// Computes hedge orders for one market from a point-in-time snapshot.
///
/// All inputs are taken by value and never mutated after construction; the
/// only moving part is the risk tolerance inside the retry loop.
pub struct CashoutEngine<S> {
    book: BookSnapshot,
    matched: MatchedPositions,
    open: OpenPositions,
    pnl: PnlOutcomes,
    mode: Mode,
    constrain_by_volume: bool,
    max_std_allowed: f64,
    solver: S,
}

impl<S: ConeSolver> CashoutEngine<S> {
    /// Builds an engine for one market.
    ///
    /// Selections present in the book but absent from `matched` are filled
    /// with empty positions so the PnL map and the stake vector line up.
    pub fn new(
        book: BookSnapshot,
        matched: MatchedPositions,
        open: OpenPositions,
        mode: Mode,
        constrain_by_volume: bool,
        max_std_allowed: f64,
        solver: S,
    ) -> Self {
        let matched = fill_missing_selections(&matched, &book.selection_ids);
        let pnl = pnl_outcomes(&matched, &book.selection_ids);
        Self {
            book,
            matched,
            open,
            pnl,
            mode,
            constrain_by_volume,
            max_std_allowed,
            solver,
        }
    }

    /// The per-outcome PnL of the current matched positions.
    #[must_use]
    pub fn pnl_outcomes(&self) -> &PnlOutcomes {
        &self.pnl
    }

    /// Open (resting) orders, passed through for reporting.
    #[must_use]
    pub fn open_positions(&self) -> &OpenPositions {
        &self.open
    }

    /// True when the outcome-by-outcome PnL already disperses no more than
    /// the configured tolerance (population std-dev, boundary inclusive).
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.pnl.std_dev() <= self.max_std_allowed
    }

    /// Computes hedge orders, relaxing the dispersion bound geometrically
    /// when the solver reports infeasibility.
    ///
    /// Returns `Ok(None)` — deliberately not an error — once the tolerance
    /// exceeds [`MAX_STD_CEILING`]: past that point a hedge no longer means
    /// anything economically.
    ///
    /// # Errors
    ///
    /// Only structural problems surface here (empty book, missing
    /// complementary PnL); solver infeasibility never does.
    pub fn hedge_orders(&self) -> Result<Option<CashoutResult>, CashoutError> {
        if self.book.levels() == 0 {
            return Err(CashoutError::EmptyBook(self.book.market_id.clone()));
        }

        if self.book.selections() == 1 {
            return self.single_selection().map(Some);
        }

        let mut tolerance = self.max_std_allowed;
        loop {
            match self.neutralize_at(tolerance) {
                Ok(result) => return Ok(Some(result)),
                Err(err) => {
                    warn!(
                        market_id = %self.book.market_id,
                        tolerance,
                        %err,
                        "neutralization attempt failed"
                    );
                    if tolerance > MAX_STD_CEILING {
                        info!(
                            market_id = %self.book.market_id,
                            tolerance,
                            "tolerance ceiling exceeded, no hedge available"
                        );
                        return Ok(None);
                    }
                    tolerance *= 2.0;
                    info!(
                        market_id = %self.book.market_id,
                        tolerance,
                        "retrying with doubled tolerance"
                    );
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Single-selection closed form
    // -------------------------------------------------------------------------

    /// Pure-equilibrium hedge for a market with one selection: no
    /// optimization, just the stake that equalizes the two outcomes at the
    /// chosen quote.
    fn single_selection(&self) -> Result<CashoutResult, CashoutError> {
        let selection_id = self.book.selection_ids[0];
        let pnl_happen = self.pnl.by_selection[&selection_id];
        let pnl_not_happen = self
            .pnl
            .complementary
            .ok_or_else(|| CashoutError::MissingComplementary(self.book.market_id.clone()))?;

        let best_back = self.book.back_prices[0][0];
        let best_lay = self.book.lay_prices[0][0];

        let order = if pnl_happen > pnl_not_happen {
            // Over-exposed to the event happening: lay it.
            let price = match self.mode {
                Mode::Taker => best_lay,
                Mode::Maker => best_back,
            };
            let stake = (pnl_happen - pnl_not_happen) / price;
            Order::proposed(
                self.book.market_id.clone(),
                selection_id,
                Side::Lay,
                price,
                stake,
            )
        } else {
            let price = match self.mode {
                Mode::Taker => best_back,
                Mode::Maker => best_lay,
            };
            let stake = (pnl_not_happen - pnl_happen) / price;
            Order::proposed(
                self.book.market_id.clone(),
                selection_id,
                Side::Back,
                price,
                stake,
            )
        };

        debug!(
            market_id = %self.book.market_id,
            side = %order.side,
            price = order.price,
            stake = order.size_remaining,
            "single-selection hedge"
        );

        let probability = 0.5 / best_back + 0.5 / best_lay;
        Ok(CashoutResult {
            orders: vec![order],
            expected_pnl_before: Some(
                probability * pnl_happen + (1.0 - probability) * pnl_not_happen,
            ),
            expected_pnl_after: None,
            worst_outcome_before: self.pnl.worst(),
            worst_outcome_after: None,
        })
    }

    // -------------------------------------------------------------------------
    // Multi-selection optimization
    // -------------------------------------------------------------------------

    /// One optimization attempt at a given dispersion tolerance.
    fn neutralize_at(&self, tolerance: f64) -> Result<CashoutResult, SolverError> {
        let problem = self.build_problem(tolerance);

        let probabilities = self.implied_probabilities();
        let pnl_current = self.pnl_vector();
        let expected_before = pnl_current.dot(&probabilities);

        let stakes = self.solver.solve(&problem)?;

        // objective = −(Mᵀp), so the expected improvement is −objective·x.
        let expected_after = expected_before - problem.objective.dot(&stakes);
        info!(
            market_id = %self.book.market_id,
            expected_before,
            expected_after,
            tolerance,
            "neutralization solved"
        );

        let orders = vector_to_orders(&self.book, self.mode, &stakes);
        Ok(CashoutResult {
            orders,
            expected_pnl_before: Some(expected_before),
            expected_pnl_after: Some(expected_after),
            worst_outcome_before: self.pnl.worst(),
            // Never computed by this path; kept absent on purpose.
            worst_outcome_after: None,
        })
    }

    /// Assembles the cone problem for one tolerance value.
    ///
    /// Decision vector: one stake per `(side, level, selection)` in the
    /// materializer's layout. Objective: negated probability-weighted
    /// expected PnL change. Cone: centered post-hedge PnL norm bounded by
    /// the tolerance.
    fn build_problem(&self, tolerance: f64) -> ConeProblem {
        let exposure = self.exposure_matrix();
        let probabilities = self.implied_probabilities();
        let pnl_current = self.pnl_vector();

        let objective = -exposure.t().dot(&probabilities);

        let centering = Self::centering_matrix(self.book.selections());
        let cone_matrix = centering.dot(&exposure);
        let cone_offset = centering.dot(&pnl_current);

        let upper_bounds = self.constrain_by_volume.then(|| self.volume_caps());

        ConeProblem {
            objective,
            upper_bounds,
            cone: NormConstraint {
                matrix: cone_matrix,
                offset: cone_offset,
                bound: tolerance,
            },
        }
    }

    /// The linear map from stakes to per-outcome PnL change.
    ///
    /// Per level, the BACK block is `price − 1` on the diagonal (profit if
    /// that selection wins) and `−1` off it (stake forfeited otherwise);
    /// the LAY block mirrors it: `−(price − 1)` on the diagonal, `+1` off.
    fn exposure_matrix(&self) -> Array2<f64> {
        let n = self.book.selections();
        let levels = self.book.levels();
        let mut m = Array2::zeros((n, 2 * n * levels));

        for level in 0..levels {
            for k in 0..n {
                let back_col = back_index(level, k, n);
                let lay_col = lay_index(level, k, n);
                for row in 0..n {
                    if row == k {
                        m[[row, back_col]] = self.book.back_prices[level][k] - 1.0;
                        m[[row, lay_col]] = -(self.book.lay_prices[level][k] - 1.0);
                    } else {
                        m[[row, back_col]] = -1.0;
                        m[[row, lay_col]] = 1.0;
                    }
                }
            }
        }
        m
    }

    /// Market-implied outcome probabilities from the top of the book.
    ///
    /// A convenience proxy, not a true distribution: it need not sum to 1.
    fn implied_probabilities(&self) -> Array1<f64> {
        let n = self.book.selections();
        Array1::from_iter(
            (0..n).map(|k| 0.5 / self.book.back_prices[0][k] + 0.5 / self.book.lay_prices[0][k]),
        )
    }

    /// Current PnL as a vector in book-selection order.
    fn pnl_vector(&self) -> Array1<f64> {
        Array1::from_iter(
            self.book
                .selection_ids
                .iter()
                .map(|id| self.pnl.by_selection[id]),
        )
    }

    /// `I − J/n`: subtracting the mean as a matrix.
    fn centering_matrix(n: usize) -> Array2<f64> {
        let mut c = Array2::from_elem((n, n), -1.0 / n as f64);
        for i in 0..n {
            c[[i, i]] += 1.0;
        }
        c
    }

    /// Per-stake caps from the size available at each book cell.
    fn volume_caps(&self) -> Array1<f64> {
        let n = self.book.selections();
        let levels = self.book.levels();
        let mut caps = Array1::zeros(2 * n * levels);
        for level in 0..levels {
            for k in 0..n {
                caps[back_index(level, k, n)] = self.book.back_sizes[level][k];
                caps[lay_index(level, k, n)] = self.book.lay_sizes[level][k];
            }
        }
        caps
    }

    /// Read access to the matched positions after missing-selection fill,
    /// mainly for reporting.
    #[must_use]
    pub fn matched_positions(&self) -> &MatchedPositions {
        &self.matched
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bet_hedge_core::types::{Market, PriceSize, Runner};
    use bet_hedge_core::PositionLedger;
    use bet_hedge_solver::ProjectedGradientSolver;
    use chrono::Utc;
    use std::sync::Mutex;

    fn ps(price: f64, size: f64) -> PriceSize {
        PriceSize { price, size }
    }

    fn runner(selection_id: u64, back: f64, lay: f64) -> Runner {
        Runner {
            selection_id,
            available_to_back: vec![ps(back, 500.0)],
            available_to_lay: vec![ps(lay, 500.0)],
        }
    }

    fn book_of(runners: Vec<Runner>) -> BookSnapshot {
        let market = Market {
            market_id: "1.42".to_string(),
            start_time: Utc::now(),
            total_matched: 0.0,
            runners,
        };
        BookSnapshot::from_market(&market, 1, None)
    }

    fn matched_order(selection_id: u64, side: Side, price: f64, size: f64) -> Order {
        Order {
            market_id: "1.42".to_string(),
            selection_id,
            price,
            size_remaining: 0.0,
            size_matched: size,
            side,
            bet_id: None,
        }
    }

    fn matched_of(orders: Vec<Order>) -> MatchedPositions {
        PositionLedger::from_orders(orders).matched_for("1.42")
    }

    /// Solver stub that always reports infeasibility and records the
    /// tolerance of every attempt.
    struct AlwaysInfeasible {
        bounds: Mutex<Vec<f64>>,
    }

    impl AlwaysInfeasible {
        fn new() -> Self {
            Self {
                bounds: Mutex::new(Vec::new()),
            }
        }
    }

    impl ConeSolver for AlwaysInfeasible {
        fn solve(&self, problem: &ConeProblem) -> Result<Array1<f64>, SolverError> {
            self.bounds.lock().unwrap().push(problem.cone.bound);
            Err(SolverError::Infeasible)
        }
    }

    /// Solver stub that returns the zero vector and keeps the problem for
    /// inspection.
    struct ZeroReturning {
        seen: Mutex<Option<ConeProblem>>,
    }

    impl ZeroReturning {
        fn new() -> Self {
            Self {
                seen: Mutex::new(None),
            }
        }
    }

    impl ConeSolver for ZeroReturning {
        fn solve(&self, problem: &ConeProblem) -> Result<Array1<f64>, SolverError> {
            *self.seen.lock().unwrap() = Some(problem.clone());
            Ok(Array1::zeros(problem.dim()))
        }
    }

    // -------------------------------------------------------------------------
    // Single-selection closed form
    // -------------------------------------------------------------------------

    #[test]
    fn over_exposed_single_selection_lays_at_taker_lay_price() {
        // Back 6 @ 3.0 and lay 4 @ 1.5:
        //   h = 6*2 - 4*0.5 = 10, n = 4 - 6 = -2.
        let book = book_of(vec![runner(7, 1.8, 2.0)]);
        let matched = matched_of(vec![
            matched_order(7, Side::Back, 3.0, 6.0),
            matched_order(7, Side::Lay, 1.5, 4.0),
        ]);
        let engine = CashoutEngine::new(
            book,
            matched,
            OpenPositions::new(),
            Mode::Taker,
            true,
            0.05,
            ZeroReturning::new(),
        );

        let pnl = engine.pnl_outcomes();
        assert!((pnl.by_selection[&7] - 10.0).abs() < 1e-12);
        assert!((pnl.complementary.unwrap() - (-2.0)).abs() < 1e-12);

        let result = engine.hedge_orders().unwrap().unwrap();
        assert_eq!(result.orders.len(), 1);
        let order = &result.orders[0];
        assert_eq!(order.side, Side::Lay);
        assert_eq!(order.price, 2.0);
        // (h − n) / price = 12 / 2.
        assert!((order.size_remaining - 6.0).abs() < 1e-12);
        assert!(result.worst_outcome_after.is_none());
    }

    #[test]
    fn taker_lay_hedge_stake_from_spec_example() {
        // h = 10, n = 2, taker, lay price 2.0 => one LAY order, stake 4.0.
        // Back 4 @ 4.25 and lay 6 @ 1.5:
        //   h = 4*3.25 − 6*0.5 = 10, n = 6 − 4 = 2.
        let book = book_of(vec![runner(9, 1.9, 2.0)]);
        let matched = matched_of(vec![
            matched_order(9, Side::Back, 4.25, 4.0),
            matched_order(9, Side::Lay, 1.5, 6.0),
        ]);
        let engine = CashoutEngine::new(
            book,
            matched,
            OpenPositions::new(),
            Mode::Taker,
            true,
            0.05,
            ZeroReturning::new(),
        );

        let pnl = engine.pnl_outcomes();
        assert!((pnl.by_selection[&9] - 10.0).abs() < 1e-12);
        assert!((pnl.complementary.unwrap() - 2.0).abs() < 1e-12);

        let result = engine.hedge_orders().unwrap().unwrap();
        let order = &result.orders[0];
        assert_eq!(order.side, Side::Lay);
        assert_eq!(order.price, 2.0);
        assert!((order.size_remaining - 4.0).abs() < 1e-12);
    }

    #[test]
    fn under_exposed_single_selection_backs_at_taker_back_price() {
        // h = 2, n = 10, taker, back price 1.5 => BACK stake 16/3.
        //   s_l = 14, s_b = 4: n = 10; pick p_b, p_l with
        //   h = 4(p_b−1) − 14(p_l−1) = 2 -> p_b = 2.0, p_l = 1 + 2/14:
        //   4*1.0 − 14*(1/7) = 4 − 2 = 2.
        let book = book_of(vec![runner(5, 1.5, 1.6)]);
        let matched = matched_of(vec![
            matched_order(5, Side::Back, 2.0, 4.0),
            matched_order(5, Side::Lay, 1.0 + 1.0 / 7.0, 14.0),
        ]);
        let engine = CashoutEngine::new(
            book,
            matched,
            OpenPositions::new(),
            Mode::Taker,
            true,
            0.05,
            ZeroReturning::new(),
        );

        let result = engine.hedge_orders().unwrap().unwrap();
        let order = &result.orders[0];
        assert_eq!(order.side, Side::Back);
        assert_eq!(order.price, 1.5);
        assert!((order.size_remaining - 16.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn maker_mode_swaps_the_quote_used() {
        // Same exposure as the taker lay test, but maker mode prices the
        // lay hedge off the back quote.
        let book = book_of(vec![runner(9, 1.9, 2.0)]);
        let matched = matched_of(vec![
            matched_order(9, Side::Back, 4.25, 4.0),
            matched_order(9, Side::Lay, 1.5, 6.0),
        ]);
        let engine = CashoutEngine::new(
            book,
            matched,
            OpenPositions::new(),
            Mode::Maker,
            true,
            0.05,
            ZeroReturning::new(),
        );

        let result = engine.hedge_orders().unwrap().unwrap();
        let order = &result.orders[0];
        assert_eq!(order.side, Side::Lay);
        assert_eq!(order.price, 1.9);
        assert!((order.size_remaining - 8.0 / 1.9).abs() < 1e-9);
    }

    // -------------------------------------------------------------------------
    // Retry controller
    // -------------------------------------------------------------------------

    #[test]
    fn retry_doubles_until_ceiling_then_gives_up() {
        let book = book_of(vec![runner(1, 2.0, 2.2), runner(2, 2.0, 2.2)]);
        let solver = AlwaysInfeasible::new();
        let engine = CashoutEngine::new(
            book,
            MatchedPositions::new(),
            OpenPositions::new(),
            Mode::Taker,
            false,
            1.0,
            solver,
        );

        let result = engine.hedge_orders().unwrap();
        assert!(result.is_none());

        let bounds = engine.solver.bounds.lock().unwrap();
        assert_eq!(*bounds, vec![1.0, 2.0, 4.0, 8.0, 16.0]);
    }

    // -------------------------------------------------------------------------
    // Problem construction
    // -------------------------------------------------------------------------

    #[test]
    fn zero_stake_vector_is_feasible_with_no_exposure() {
        // 2 outcomes, identical back/lay prices, no position: x = 0 must
        // satisfy every constraint.
        let book = book_of(vec![runner(1, 2.0, 2.0), runner(2, 2.0, 2.0)]);
        let solver = ZeroReturning::new();
        let engine = CashoutEngine::new(
            book,
            MatchedPositions::new(),
            OpenPositions::new(),
            Mode::Taker,
            true,
            0.05,
            solver,
        );

        let result = engine.hedge_orders().unwrap().unwrap();
        let problem = engine.solver.seen.lock().unwrap().clone().unwrap();
        let zero = Array1::zeros(problem.dim());
        assert!(problem.is_feasible(&zero, 1e-12));

        // With no exposure and the zero vector back, nothing changes.
        let before = result.expected_pnl_before.unwrap();
        let after = result.expected_pnl_after.unwrap();
        assert!((before - after).abs() < 1e-12);
        assert_eq!(before, 0.0);
    }

    #[test]
    fn objective_and_cone_follow_the_exposure_matrix() {
        let book = book_of(vec![runner(1, 2.0, 2.2), runner(2, 3.0, 3.5)]);
        let solver = ZeroReturning::new();
        let engine = CashoutEngine::new(
            book,
            MatchedPositions::new(),
            OpenPositions::new(),
            Mode::Taker,
            true,
            0.05,
            solver,
        );
        engine.hedge_orders().unwrap();
        let problem = engine.solver.seen.lock().unwrap().clone().unwrap();

        // Vector layout: [back_1, back_2, lay_1, lay_2].
        assert_eq!(problem.dim(), 4);

        let p1 = 0.5 / 2.0 + 0.5 / 2.2;
        let p2 = 0.5 / 3.0 + 0.5 / 3.5;
        // Backing selection 1: +(2.0−1) if it wins, −1 if selection 2 does.
        let expected_gain_back_1 = 1.0 * p1 - 1.0 * p2;
        assert!((problem.objective[0] + expected_gain_back_1).abs() < 1e-12);
        // Laying selection 2: +1 if selection 1 wins, −(3.5−1) if 2 does.
        let expected_gain_lay_2 = 1.0 * p1 - 2.5 * p2;
        assert!((problem.objective[3] + expected_gain_lay_2).abs() < 1e-12);

        // Cone matrix is the centered exposure map: for n = 2 the centering
        // turns column (a, b) into ((a−b)/2, (b−a)/2).
        let col0 = (problem.cone.matrix[[0, 0]], problem.cone.matrix[[1, 0]]);
        assert!((col0.0 - 1.0).abs() < 1e-12); // (1 − (−1))/2
        assert!((col0.1 + 1.0).abs() < 1e-12);
        assert!((problem.cone.bound - 0.05).abs() < 1e-12);

        // Volume caps follow the book sizes.
        let caps = problem.upper_bounds.unwrap();
        assert_eq!(caps.len(), 4);
        assert!(caps.iter().all(|&c| (c - 500.0).abs() < 1e-12));
    }

    #[test]
    fn volume_constraining_disabled_leaves_stakes_uncapped() {
        let book = book_of(vec![runner(1, 2.0, 2.2), runner(2, 3.0, 3.5)]);
        let solver = ZeroReturning::new();
        let engine = CashoutEngine::new(
            book,
            MatchedPositions::new(),
            OpenPositions::new(),
            Mode::Taker,
            false,
            1.0,
            solver,
        );
        engine.hedge_orders().unwrap();
        let problem = engine.solver.seen.lock().unwrap().clone().unwrap();
        assert!(problem.upper_bounds.is_none());
    }

    // -------------------------------------------------------------------------
    // End-to-end with the real solver
    // -------------------------------------------------------------------------

    #[test]
    fn real_solver_neutralizes_a_lopsided_position() {
        // Back 10 @ 3.0 on selection 1 with even books: pnl (20, −10).
        // At price 2.0 hedging is free in expectation, so the engine can
        // compress the dispersion without giving up expected PnL.
        let book = book_of(vec![runner(1, 2.0, 2.0), runner(2, 2.0, 2.0)]);
        let matched = matched_of(vec![matched_order(1, Side::Back, 3.0, 10.0)]);
        let engine = CashoutEngine::new(
            book.clone(),
            matched.clone(),
            OpenPositions::new(),
            Mode::Taker,
            false,
            1.0,
            ProjectedGradientSolver::default(),
        );

        assert!(!engine.is_balanced());
        let result = engine.hedge_orders().unwrap().unwrap();
        let before = result.expected_pnl_before.unwrap();
        let after = result.expected_pnl_after.unwrap();
        assert!((before - 5.0).abs() < 1e-9); // 0.5·20 + 0.5·(−10)
        assert!((after - before).abs() < 0.1);

        // Re-derive the post-hedge outcome PnL from the emitted orders and
        // check the dispersion bound held (with slack for stake rounding).
        let mut delta = [0.0_f64; 2];
        for order in &result.orders {
            let k = if order.selection_id == 1 { 0 } else { 1 };
            let other = 1 - k;
            match order.side {
                Side::Back => {
                    delta[k] += (order.price - 1.0) * order.size_remaining;
                    delta[other] -= order.size_remaining;
                }
                Side::Lay => {
                    delta[k] -= (order.price - 1.0) * order.size_remaining;
                    delta[other] += order.size_remaining;
                }
            }
        }
        let new_pnl = [20.0 + delta[0], -10.0 + delta[1]];
        let spread = (new_pnl[0] - new_pnl[1]).abs();
        // ‖centered‖ = spread/√2 for n = 2; bound 1 plus rounding slack.
        assert!(spread / 2.0_f64.sqrt() <= 1.5, "spread = {spread}");
    }

    #[test]
    fn balanced_book_reports_balanced() {
        let book = book_of(vec![runner(1, 2.0, 2.0), runner(2, 2.0, 2.0)]);
        let engine = CashoutEngine::new(
            book,
            MatchedPositions::new(),
            OpenPositions::new(),
            Mode::Taker,
            true,
            0.05,
            ZeroReturning::new(),
        );
        // No positions: zero dispersion, equality with any tolerance ≥ 0.
        assert!(engine.is_balanced());
    }

    #[test]
    fn balance_check_includes_the_boundary() {
        // Lay 3 @ 2.0 on selection 2 gives pnl (3, −3): population std
        // exactly 3, equal to the tolerance.
        let book = book_of(vec![runner(1, 2.0, 2.0), runner(2, 2.0, 2.0)]);
        let engine = CashoutEngine::new(
            book,
            matched_of(vec![matched_order(2, Side::Lay, 2.0, 3.0)]),
            OpenPositions::new(),
            Mode::Taker,
            true,
            3.0,
            ZeroReturning::new(),
        );
        let std = engine.pnl_outcomes().std_dev();
        assert!((std - 3.0).abs() < 1e-12);
        assert!(engine.is_balanced()); // tolerance == std exactly
    }
}
