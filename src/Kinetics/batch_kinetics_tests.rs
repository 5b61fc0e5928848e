#[cfg(test)]
mod tests {
    use crate::Kinetics::batch_kinetics::*;
    use approx::assert_relative_eq;
    use nalgebra::DMatrix;

    fn reference_conditions() -> (ReactorConditions, ReactionOrders, KineticParameters) {
        (
            ReactorConditions::new(50.0),
            ReactionOrders::new(1.0, 1.0),
            KineticParameters::new(100.0, 30_000.0),
        )
    }

    /// central differences of `derivatives`
    fn finite_difference_jacobian(model: &BatchKinetics, c: &Concentrations) -> DMatrix<f64> {
        let mut jac = DMatrix::zeros(4, 4);
        for j in 0..4 {
            let eps = 1e-7 * (1.0 + c.0[j].abs());
            let mut plus = *c;
            let mut minus = *c;
            plus.0[j] += eps;
            minus.0[j] -= eps;
            let (f_plus, f_minus) = (model.derivatives(&plus), model.derivatives(&minus));
            for i in 0..4 {
                jac[(i, j)] = (f_plus.0[i] - f_minus.0[i]) / (2.0 * eps);
            }
        }
        jac
    }

    #[test]
    fn test_temperature_conversion() {
        assert_relative_eq!(ReactorConditions::new(50.0).temperature_K(), 323.15);
        assert_relative_eq!(ReactorConditions::new(-50.0).temperature_K(), 223.15);
    }

    #[test]
    fn test_rate_constant() {
        let (conditions, _, params) = reference_conditions();
        let expected = 100.0 * (-30_000.0f64 / (8.3145 * 323.15)).exp();
        assert_relative_eq!(rate_constant(&conditions, &params), expected, epsilon = 1e-15);
        assert_relative_eq!(expected, 1.4153e-3, max_relative = 1e-3);
    }

    #[test]
    fn test_zero_activation_energy_gives_k0() {
        let params = KineticParameters::new(42.0, 0.0);
        assert_eq!(rate_constant(&ReactorConditions::new(400.0), &params), 42.0);
    }

    #[test]
    fn test_large_activation_energy_stops_reaction() {
        let conditions = ReactorConditions::new(50.0);
        let mut previous = f64::INFINITY;
        for Ea in [1e4, 1e5, 1e6, 1e7] {
            let k = rate_constant(&conditions, &KineticParameters::new(100.0, Ea));
            assert!(k < previous);
            previous = k;
        }
        assert!(previous < 1e-300);
    }

    #[test]
    fn test_stoichiometry_of_derivatives() {
        let (conditions, orders, params) = reference_conditions();
        let c = Concentrations::new(5.0, 7.0, 0.5, 0.0);
        let rate = reaction_rate(&c, &conditions, &orders, &params);
        let d = rate_derivatives(&c, &conditions, &orders, &params);
        assert!(rate > 0.0);
        assert_eq!(d[Species::A], -rate);
        assert_eq!(d[Species::B], -rate);
        assert_eq!(d[Species::C], rate);
        assert_eq!(d[Species::D], rate);
        assert_relative_eq!(d.as_slice().iter().sum::<f64>(), 0.0);
        assert_relative_eq!(rate, rate_constant(&conditions, &params) * 35.0, epsilon = 1e-15);
    }

    #[test]
    fn test_zero_orders_rate_is_constant() {
        let (conditions, _, params) = reference_conditions();
        let orders = ReactionOrders::new(0.0, 0.0);
        let r1 = reaction_rate(&Concentrations::new(5.0, 7.0, 0.0, 0.0), &conditions, &orders, &params);
        let r2 = reaction_rate(&Concentrations::new(0.0, -3.0, 1.0, 1.0), &conditions, &orders, &params);
        assert_eq!(r1, r2);
        assert_eq!(r1, rate_constant(&conditions, &params));
    }

    #[test]
    fn test_negative_concentrations_with_integer_orders() {
        let (conditions, _, params) = reference_conditions();
        let c = Concentrations::new(-2.0, 1.0, 0.0, 0.0);
        let first = reaction_rate(&c, &conditions, &ReactionOrders::new(1.0, 1.0), &params);
        let second = reaction_rate(&c, &conditions, &ReactionOrders::new(2.0, 1.0), &params);
        assert!(first < 0.0);
        assert!(second > 0.0);
        assert_eq!(fractional_negative_species(&c, &ReactionOrders::new(2.0, 1.0)), None);
    }

    #[test]
    fn test_fractional_order_of_negative_concentration_is_nan() {
        let (conditions, _, params) = reference_conditions();
        let orders = ReactionOrders::new(1.0, 0.5);
        let c = Concentrations::new(1.0, -0.1, 0.0, 0.0);
        assert!(reaction_rate(&c, &conditions, &orders, &params).is_nan());
        assert_eq!(fractional_negative_species(&c, &orders), Some(Species::B));
        let model = BatchKinetics::new(conditions, orders, params);
        assert!(model.check_state(&c).is_err());
        assert!(model.check_state(&Concentrations::new(1.0, 0.1, 0.0, 0.0)).is_ok());
    }

    #[test]
    fn test_rate_overflow_propagates_as_value() {
        let conditions = ReactorConditions::new(50.0);
        let params = KineticParameters::new(f64::MAX, 0.0);
        let c = Concentrations::new(10.0, 10.0, 0.0, 0.0);
        let r = reaction_rate(&c, &conditions, &ReactionOrders::new(1.0, 1.0), &params);
        assert!(r.is_infinite());
    }

    #[test]
    fn test_model_matches_free_functions() {
        let (conditions, orders, params) = reference_conditions();
        let model = BatchKinetics::new(conditions, orders, params);
        let c = Concentrations::new(3.0, 2.0, 1.0, 0.5);
        assert_eq!(model.rate_constant(), rate_constant(&conditions, &params));
        assert_eq!(model.derivatives(&c), rate_derivatives(&c, &conditions, &orders, &params));
        assert_eq!(
            Concentrations::from_dvector(&model.derivatives(&c).to_dvector()),
            model.derivatives(&c)
        );
    }

    #[test]
    fn test_rate_equations_are_symbolic_power_law() {
        let (conditions, _, params) = reference_conditions();
        let model = BatchKinetics::new(conditions, ReactionOrders::new(2.0, 1.0), params);
        let equations = model.rate_equations();
        assert_eq!(equations.len(), 4);
        assert_eq!(equations[0], equations[1]);
        assert_eq!(equations[2], equations[3]);
        let expr_str = format!("{:?}", model.rate_expression());
        assert!(expr_str.contains("Var(\"CA\")"));
        assert!(expr_str.contains("Var(\"CB\")"));
        assert!(expr_str.contains("Pow"));

        // the zeroth order drops the factor: the rate is the bare constant
        let constant = BatchKinetics::new(conditions, ReactionOrders::new(0.0, 0.0), params);
        let expr_str = format!("{:?}", constant.rate_expression());
        assert!(!expr_str.contains("Var"));
    }

    #[test]
    fn test_analytic_jacobian_matches_finite_differences() {
        let (conditions, _, params) = reference_conditions();
        for orders in [
            ReactionOrders::new(1.0, 1.0),
            ReactionOrders::new(2.0, 0.5),
            ReactionOrders::new(0.0, 1.5),
        ] {
            let model = BatchKinetics::new(conditions, orders, params);
            let c = Concentrations::new(2.0, 3.0, 0.5, 0.1);
            let analytic = model.jacobian(&c);
            let numeric = finite_difference_jacobian(&model, &c);
            for i in 0..4 {
                for j in 0..4 {
                    assert_relative_eq!(analytic[(i, j)], numeric[(i, j)], epsilon = 1e-8, max_relative = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_zero_order_jacobian_has_no_singularity() {
        let (conditions, _, params) = reference_conditions();
        let model = BatchKinetics::new(conditions, ReactionOrders::new(0.0, 1.0), params);
        let jac = model.jacobian(&Concentrations::new(0.0, 1.0, 0.0, 0.0));
        assert!(jac.iter().all(|v| v.is_finite()));
        assert_eq!(jac[(0, 0)], 0.0);
    }

    #[test]
    fn test_fractional_order_jacobian_is_finite_at_zero_concentration() {
        let (conditions, _, params) = reference_conditions();
        let model = BatchKinetics::new(conditions, ReactionOrders::new(0.5, 1.0), params);
        let depleted = Concentrations::new(0.0, 7.0, 0.5, 0.0);
        let jac = model.jacobian(&depleted);
        assert!(jac.iter().all(|v| v.is_finite()));
        assert_eq!(jac[(0, 0)], 0.0);
        assert_eq!(jac[(0, 1)], 0.0);
        assert!(model.stiffness_indicator(&depleted, 100.0).is_finite());
        // away from zero the derivative is the usual n*C^(n-1)
        let jac = model.jacobian(&Concentrations::new(0.25, 7.0, 0.5, 0.0));
        assert_relative_eq!(jac[(0, 0)], -model.rate_constant() * 0.5 * 0.25f64.powf(-0.5) * 7.0, max_relative = 1e-12);
    }

    #[test]
    fn test_stiffness_indicator_grows_with_rate_constant() {
        let (conditions, orders, _) = reference_conditions();
        let c = Concentrations::new(5.0, 7.0, 0.5, 0.0);
        let slow = BatchKinetics::new(conditions, orders, KineticParameters::new(100.0, 30_000.0));
        let fast = BatchKinetics::new(conditions, orders, KineticParameters::new(1e6, 0.0));
        // every row of J sums to k*(CB + CA) in absolute value
        assert_relative_eq!(
            slow.stiffness_indicator(&c, 100.0),
            slow.rate_constant() * 12.0 * 100.0,
            max_relative = 1e-12
        );
        assert!(fast.stiffness_indicator(&c, 100.0) > 1e9);
    }

    #[test]
    fn test_species_keys() {
        assert_eq!("a".parse::<Species>(), Ok(Species::A));
        assert_eq!(" D ".parse::<Species>(), Ok(Species::D));
        assert!("X".parse::<Species>().is_err());
        assert_eq!(Species::C.label(), "Conc C");
        assert_eq!(Species::B.column_header(), "B (mol/L)");
        assert!(Species::A.is_reactant() && !Species::D.is_reactant());
        let c = Concentrations::new(1.0, f64::NAN, 3.0, 4.0);
        assert_eq!(c.first_non_finite(), Some(Species::B));
        assert!(!c.is_finite());
    }
}
